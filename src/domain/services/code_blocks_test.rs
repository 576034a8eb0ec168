use test_utils::simulation_response_fixture;

use super::extract_script;
use super::ScriptExtract;

#[test]
fn it_extracts_a_labeled_fence() {
    let res = extract_script(simulation_response_fixture());
    match res {
        ScriptExtract::Fenced(code) => {
            assert!(code.starts_with("import pygame"));
            assert!(code.ends_with("pygame.quit()"));
            assert!(!code.contains("```"));
        }
        ScriptExtract::Whole(_) => panic!("expected a fenced extract"),
    }
}

#[test]
fn it_extracts_an_unlabeled_fence() {
    let response = "Sure!\n```\nprint('hi')\n```\nEnjoy.";
    assert_eq!(
        extract_script(response),
        ScriptExtract::Fenced("print('hi')".to_string())
    );
}

#[test]
fn it_takes_only_the_first_fence() {
    let response = "```python\nprint('one')\n```\nAnd also:\n```python\nprint('two')\n```";
    assert_eq!(
        extract_script(response),
        ScriptExtract::Fenced("print('one')".to_string())
    );
}

#[test]
fn it_falls_back_to_the_whole_response() {
    let response = "import math\nprint(math.pi)";
    assert_eq!(
        extract_script(response),
        ScriptExtract::Whole(response.to_string())
    );
}

#[test]
fn it_treats_an_unterminated_fence_as_prose() {
    let response = "```python\nprint('never closed')";
    assert_eq!(
        extract_script(response),
        ScriptExtract::Whole(response.to_string())
    );
}
