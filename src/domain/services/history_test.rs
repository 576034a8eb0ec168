use super::context_window;
use crate::domain::models::Exchange;

fn exchange(request: &str) -> Exchange {
    return Exchange {
        request: request.to_string(),
        code: "print('hi')".to_string(),
    };
}

#[test]
fn it_is_empty_without_history() {
    assert_eq!(context_window(&[], 3), "");
}

#[test]
fn it_windows_to_the_last_three_oldest_first() {
    let exchanges = vec![
        exchange("first"),
        exchange("second"),
        exchange("third"),
        exchange("fourth"),
        exchange("fifth"),
    ];

    let context = context_window(&exchanges, 3);

    assert!(!context.contains("User: first"));
    assert!(!context.contains("User: second"));
    assert!(context.contains("User: third"));
    assert!(context.contains("User: fourth"));
    assert!(context.contains("User: fifth"));

    let third = context.find("User: third").unwrap();
    let fourth = context.find("User: fourth").unwrap();
    let fifth = context.find("User: fifth").unwrap();
    assert!(third < fourth && fourth < fifth);
}

#[test]
fn it_keeps_short_histories_whole() {
    let exchanges = vec![exchange("only")];
    let context = context_window(&exchanges, 3);

    assert!(context.contains("**Exchange 1:**"));
    assert!(context.contains("User: only"));
}
