use raytrace_seed::*;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "raytrace_seed-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn checker(x: u32, y: u32) -> Color {
    if (x + y) % 2 == 0 {
        Color::rgba(x as u8 * 16, y as u8 * 16, 200, 255)
    } else {
        Color::rgba(0, 0, 0, (x * y) as u8)
    }
}

#[test]
fn round_trip() {
    let dir = scratch_dir("round_trip");
    let path = dir.join("checker.png");

    let mut scene = Scene::new(9, 5).unwrap();
    scene.for_each_pixel(checker);
    scene.persist(&path).unwrap();

    let loaded = Scene::load(&path).unwrap();
    assert_eq!(loaded.w(), 9);
    assert_eq!(loaded.h(), 5);
    assert_eq!(loaded, scene);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn round_trip_ignores_extension() {
    let dir = scratch_dir("any_extension");
    let mut scene = Scene::new(3, 2).unwrap();
    scene.for_each_pixel(checker);

    for name in &["frame.out", "frame", "frame.jpg"] {
        let path = dir.join(name);
        scene.persist(&path).unwrap();
        assert_eq!(Scene::load(&path).unwrap(), scene);
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn persist_overwrites_and_stays_usable() {
    let dir = scratch_dir("overwrite");
    let path = dir.join("out.png");

    let mut scene = Scene::new(4, 4).unwrap();
    scene.for_each_pixel(|_, _| Color::WHITE);
    scene.persist(&path).unwrap();

    scene.for_each_pixel(|_, _| Color::rgb(1, 2, 3));
    scene.persist(&path).unwrap();
    scene.persist(dir.join("copy.png")).unwrap();

    let loaded = Scene::load(&path).unwrap();
    assert!(loaded.pixels().iter().all(|c| *c == Color::rgb(1, 2, 3)));
    assert_eq!(Scene::load(dir.join("copy.png")).unwrap(), loaded);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn persist_missing_directory_fails() {
    let dir = scratch_dir("missing");
    let path = dir.join("no").join("such").join("dir.png");
    let scene = Scene::new(2, 2).unwrap();
    match scene.persist(&path) {
        Err(SceneError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Io error, got {:?}", other),
    }
    assert!(!path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn persist_onto_directory_fails() {
    let dir = scratch_dir("onto_dir");
    let scene = Scene::new(2, 2).unwrap();
    assert!(matches!(
        scene.persist(&dir),
        Err(SceneError::Io { .. }) | Err(SceneError::PermissionDenied { .. })
    ));
    assert!(dir.is_dir());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[cfg(unix)]
#[test]
fn persist_read_only_directory_fails() {
    use std::os::unix::fs::PermissionsExt;

    let dir = scratch_dir("read_only");
    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555)).unwrap();
    let path = dir.join("out.png");
    let result = Scene::new(2, 2).unwrap().persist(&path);
    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();

    // privileged users bypass directory permissions
    if path.exists() {
        assert!(result.is_ok());
    } else {
        match result {
            Err(SceneError::PermissionDenied { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected PermissionDenied, got {:?}", other),
        }
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_missing_file_fails() {
    let dir = scratch_dir("load_missing");
    assert!(matches!(
        Scene::load(dir.join("absent.png")),
        Err(SceneError::Io { .. })
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}
