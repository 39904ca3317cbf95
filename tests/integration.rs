// SPDX-License-Identifier: MPL-2.0
use easel::app::{run_lines, Session};
use easel::config::{self, Config};
use easel::editor::{Editor, EditorSettings};
use easel::i18n::fluent::I18n;
use easel::media::Downloads;
use easel::storage::{Gateway, DOCUMENT_KEY};
use image_rs::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x * 3) as u8, (y * 3) as u8, 90, 255]))
        .save_with_format(path, ImageFormat::Png)
        .expect("write png");
}

fn session(root: &Path, host: Option<&Path>) -> Session {
    let settings = EditorSettings {
        batch_delay: Duration::ZERO,
        ..EditorSettings::default()
    };
    let editor = Editor::new(
        settings,
        Gateway::from_dirs(host.map(Path::to_path_buf), root.join("data")),
        Downloads::new(root.join("downloads")),
    );
    Session::new(editor, I18n::new(Some("en-US".into()), &Config::default()))
}

async fn run_script(session: &mut Session, script: &str) -> String {
    let mut output = Vec::new();
    run_lines(session, script.as_bytes(), &mut output)
        .await
        .expect("script runs");
    String::from_utf8(output).expect("utf8 output")
}

#[test]
fn language_follows_config_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("settings.toml");

    let mut config = Config::default();
    config.general.language = Some("fa".to_string());
    config::save_to_path(&config, &path).expect("Failed to write config file");

    let loaded = config::load_from_path(&path).expect("Failed to load config");
    let i18n = I18n::new(None, &loaded);
    assert_eq!(i18n.current_locale().to_string(), "fa");

    let i18n = I18n::new(Some("en-US".to_string()), &loaded);
    assert_eq!(i18n.current_locale().to_string(), "en-US");
}

#[tokio::test]
async fn scripted_session_edits_and_exports() {
    let dir = tempdir().expect("temp dir");
    let image = dir.path().join("input.png");
    write_png(&image, 80, 60);
    let mut session = session(dir.path(), None);

    let script = format!(
        "open {}\n\
         filter brightness 120\n\
         nudge 90\n\
         resize 40 -\n\
         format jpg\n\
         dim-add 16 16\n\
         dim-add 0 15\n\
         dim-add 16 16\n\
         export-all\n\
         download\n",
        image.display()
    );
    let output = run_script(&mut session, &script).await;
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], "Image loaded: 80 × 60.");
    assert_eq!(lines[3], "Resized to 40 × 30.");
    assert_eq!(lines[5], "Export size 16 × 16 added (1 total).");
    assert_eq!(lines[6], "Export size 20 × 15 added (2 total).");
    assert_eq!(lines[7], "Export size 16 × 16 is already in the list.");
    assert_eq!(lines[8], "Files exported: 2.");

    let downloads = dir.path().join("downloads");
    for name in ["image-16x16.jpg", "image-20x15.jpg", "edited.jpg"] {
        assert!(downloads.join(name).exists(), "{name} missing");
    }
    let edited = image_rs::open(downloads.join("edited.jpg")).expect("decode edited");
    assert_eq!((edited.width(), edited.height()), (40, 30));
}

#[tokio::test]
async fn crop_rejection_then_undo_redo() {
    let dir = tempdir().expect("temp dir");
    let image = dir.path().join("input.png");
    write_png(&image, 50, 50);
    let mut session = session(dir.path(), None);

    let script = format!(
        "open {}\n\
         crop-start\n\
         pointer down 10 10\n\
         pointer up 15 15\n\
         crop-apply\n\
         pointer down 10 10\n\
         pointer up 20 20\n\
         crop-apply\n\
         undo\n\
         undo\n\
         key Ctrl+Y\n\
         key Ctrl+Y\n",
        image.display()
    );
    let output = run_script(&mut session, &script).await;
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        lines[3],
        "Selection is too small (5 × 5); both sides need at least 10 px."
    );
    assert_eq!(lines[5], "Cropped to 10 × 10.");
    assert_eq!(lines[6], "Undone.");
    assert_eq!(lines[7], "Nothing to undo.");
    assert_eq!(lines[8], "Redone.");
    assert_eq!(lines[9], "Nothing to redo.");
    assert_eq!(
        session.editor().canvas_size().map(|s| (s.width, s.height)),
        Some((10, 10))
    );
}

#[tokio::test]
async fn session_survives_restart_through_host_store() {
    let dir = tempdir().expect("temp dir");
    let host = dir.path().join("host");
    std::fs::create_dir_all(&host).expect("host dir");
    let image = dir.path().join("input.png");
    write_png(&image, 30, 20);

    {
        let mut first = session(dir.path(), Some(&host));
        let script = format!(
            "open {}\nfilter sepia 40\nflip h\ndim-add 10 10\ntheme light\n",
            image.display()
        );
        run_script(&mut first, &script).await;
    }
    assert!(host.join("host-store.cbor").exists());
    assert!(!dir
        .path()
        .join("data")
        .join(format!("{DOCUMENT_KEY}.json"))
        .exists());

    let mut second = session(dir.path(), Some(&host));
    let restored = second.restore().await;
    assert_eq!(restored.as_deref(), Some("Previous session restored (30 × 20)."));

    let state = second.editor().state();
    assert_eq!(state.filters.sepia, 40.0);
    assert!(state.transform.flip_horizontal);
    assert_eq!(state.targets.len(), 1);
    assert_eq!(state.theme, easel::editor::Theme::Light);
}

#[tokio::test]
async fn non_image_files_are_ignored_by_the_shell() {
    let dir = tempdir().expect("temp dir");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"not an image").expect("write");
    let mut session = session(dir.path(), None);

    let output = run_script(&mut session, &format!("open {}\ninfo\n", notes.display())).await;
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].starts_with("Ignored "));
    assert_eq!(lines[1], "No image loaded.");
}
