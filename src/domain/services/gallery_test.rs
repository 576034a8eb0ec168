use tempfile::TempDir;

use super::extract_features;
use super::Gallery;
use crate::domain::models::Framework;

fn gallery_in(temp_dir: &TempDir) -> Gallery {
    return Gallery::new(temp_dir.path().join("gallery"));
}

#[tokio::test]
async fn it_lists_nothing_for_a_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let gallery = gallery_in(&temp_dir);

    let entries = gallery.list().await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn it_adds_and_lists_examples() {
    let temp_dir = TempDir::new().unwrap();
    let gallery = gallery_in(&temp_dir);

    let filename = gallery
        .add(
            "a bouncing ball with gravity sliders",
            "Interactive sliders for gravity.",
            "1. Build a Ball class",
            "print('ball')",
            Framework::PyGame,
            None,
            None,
            None,
        )
        .await
        .unwrap();

    assert!(filename.starts_with("a_bouncing_ball_"));
    assert!(filename.ends_with(".py"));

    let entries = gallery.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].filename, filename);
    assert_eq!(entries[0].metadata.title, "A Bouncing Ball With Simulation");
    assert_eq!(entries[0].metadata.framework, "PyGame");
    assert!(entries[0].metadata.user_generated);
    assert!(entries[0]
        .metadata
        .features
        .contains(&"Interactive sliders".to_string()));

    let code = gallery.load_code(&filename).await.unwrap();
    assert_eq!(code, "print('ball')");
}

#[tokio::test]
async fn it_synthesizes_metadata_for_orphan_scripts() {
    let temp_dir = TempDir::new().unwrap();
    let gallery = gallery_in(&temp_dir);

    tokio::fs::create_dir_all(&gallery.gallery_dir).await.unwrap();
    tokio::fs::write(gallery.gallery_dir.join("projectile_motion.py"), "print('p')")
        .await
        .unwrap();

    let entries = gallery.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].filename, "projectile_motion.py");
    assert_eq!(entries[0].metadata.title, "Projectile Motion Simulation");
    assert!(!entries[0].metadata.user_generated);
}

#[tokio::test]
async fn it_only_deletes_user_generated_examples() {
    let temp_dir = TempDir::new().unwrap();
    let gallery = gallery_in(&temp_dir);

    tokio::fs::create_dir_all(&gallery.gallery_dir).await.unwrap();
    tokio::fs::write(gallery.gallery_dir.join("projectile_motion.py"), "print('p')")
        .await
        .unwrap();
    gallery.list().await.unwrap();

    let res = gallery
        .delete("projectile_motion.py")
        .await
        .unwrap_err()
        .to_string();
    insta::assert_snapshot!(res, @"projectile_motion.py is not a user-generated example and cannot be deleted");

    let filename = gallery
        .add(
            "a pendulum",
            "",
            "",
            "print('pendulum')",
            Framework::PyGame,
            None,
            None,
            None,
        )
        .await
        .unwrap();

    gallery.delete(&filename).await.unwrap();
    let entries = gallery.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(gallery.load_code(&filename).await.is_err());
}

#[test]
fn it_extracts_known_features() {
    let features = extract_features(
        "Sliders to control gravity and friction.",
        "A physics simulation with collision detection.",
    );

    assert!(features.contains(&"Interactive sliders".to_string()));
    assert!(features.contains(&"Gravity effects".to_string()));
    assert!(features.contains(&"Friction effects".to_string()));
    assert!(features.contains(&"Physics simulation".to_string()));
    assert!(features.contains(&"Collision detection".to_string()));
    assert!(features.len() <= 6);
}

#[test]
fn it_falls_back_to_generic_features() {
    let features = extract_features("", "");
    assert_eq!(
        features,
        vec!["Custom simulation".to_string(), "Interactive features".to_string()]
    );
}
