use recql::{impl_record, parse, DefaultMatcher, Expr};

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: i64,
    score: f64,
    location: String,
    role: String,
}

impl_record!(User {
    id => "id",
    name => "name",
    age => "age",
    score => "score",
    location => "location",
    role => "role",
});

fn user(id: i64, name: &str, age: i64, score: f64, location: &str, role: &str) -> User {
    User {
        id,
        name: name.to_string(),
        age,
        score,
        location: location.to_string(),
        role: role.to_string(),
    }
}

fn john() -> User {
    user(1, "John Doe", 30, 4.5, "New York", "admin")
}

fn query(q: &str) -> Expr {
    parse("test", q).unwrap()
}

fn check(q: &str, u: &User) -> bool {
    query(q).matches(u, &DefaultMatcher)
}

#[test]
fn test_simple_matching() {
    assert!(check(r#"name = "John Doe""#, &john()));
}

#[test]
fn test_complex_matching() {
    assert!(check(
        r#"age >= 25 and location:["New York", "Los Angeles"] and score > 4.0"#,
        &john()
    ));
}

#[test]
fn test_numeric_comparisons() {
    let u = john();
    for q in ["age > 20", "age < 40", "age >= 30", "age <= 30", "score > 4.0", "score < 5.0"] {
        assert!(check(q, &u), "{} should match", q);
    }
    assert!(!check("age < 30", &u));
    assert!(!check("score > 4", &u), "integer literal against a float field");
}

#[test]
fn test_string_operations() {
    let u = john();
    for q in [r#"name:"John Doe""#, r#"name~"John""#, r#"location:"New York""#, "role:admin"] {
        assert!(check(q, &u), "{} should match", q);
    }
    let jane = user(2, "Jane", 25, 3.8, "Los Angeles", "user");
    assert!(!check(r#"name~"John""#, &jane));
}

#[test]
fn test_not_expressions() {
    let u = john();
    for q in [
        "not age < 25",
        r#"not location:"Los Angeles""#,
        r#"not (role:"user" and score < 3.0)"#,
    ] {
        assert!(check(q, &u), "{} should match", q);
    }
}

#[test]
fn test_multi_match() {
    let users = vec![
        john(),
        user(2, "Jane Smith", 25, 3.8, "Los Angeles", "user"),
        user(3, "Bob Johnson", 35, 4.2, "Chicago", "user"),
        user(4, "Alice Smith", 25, 3.8, "Los Angeles", "admin"),
    ];

    let expr = query(r#"(age >= 30 and score > 4.0) or (location:"Los Angeles" and role:"user")"#);
    let ids: Vec<i64> = expr.filter(&users, &DefaultMatcher).iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_one_of_expressions() {
    let u = john();
    assert!(check(r#"location:["New York", "Los Angeles", "Chicago"]"#, &u));
    assert!(check(r#"role:["admin", "superuser"]"#, &u));
    assert!(check("age:[25, 30, 35]", &u));
    assert!(check("role:[admin, superuser]", &u));
    assert!(check(r#"name~["Smith", "Doe"]"#, &u));

    let plain = user(5, "Sam", 40, 1.0, "Austin", "user");
    assert!(!check(r#"role:["admin", "superuser"]"#, &plain));
    assert!(!check("age>[10, 20]", &u));
    assert!(!check("role:[]", &u));
}

#[test]
fn test_edge_cases() {
    let u = john();
    assert!(!check(r#"nonexistent:"value""#, &u));
    assert!(!check(r#"age:"not a number""#, &u));
    assert!(!check(r#"name:"""#, &u));
    assert!(!check("score:0", &u));
    assert!(check(
        r#"(age > 20 and age < 40) and (score >= 4.0 or role:"admin")"#,
        &u
    ));
}

#[test]
fn test_threshold_is_strict() {
    let mut u = john();
    u.score = 0.003;
    assert!(!check("score<0.003", &u));
    assert!(check("score<=0.003", &u));
}

#[test]
fn test_status_scenario() {
    struct Response {
        code: i64,
    }
    impl_record!(Response { code => "status" });

    assert!(check_response("status:200", &Response { code: 200 }));
    assert!(!check_response("status:404", &Response { code: 200 }));
    assert!(!check_response("code:200", &Response { code: 200 }));

    fn check_response(q: &str, r: &Response) -> bool {
        query(q).matches(r, &DefaultMatcher)
    }
}

#[test]
fn test_query_is_shared_across_threads() {
    let expr = query("age >= 30");
    let users = vec![john(), user(2, "Jane", 25, 3.8, "LA", "user")];

    let shared = &expr;
    let results: Vec<bool> = std::thread::scope(|s| {
        let handles: Vec<_> = users
            .iter()
            .map(|u| s.spawn(move || shared.matches(u, &DefaultMatcher)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, vec![true, false]);
}
