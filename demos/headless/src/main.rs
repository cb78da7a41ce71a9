//! Headless walk through the interaction pipeline.
//!
//! Builds an editor, feeds it a scripted mix of commands, synthetic slint
//! window events and keyboard shortcuts, and prints the resulting graph.
//!
//! ```text
//! RUST_LOG=slint_node_interaction=debug cargo run -p headless -- settings.toml
//! ```

use serde_json::json;
use slint::platform::{Key, PointerEventButton, WindowEvent};
use slint::LogicalPosition;
use slint_node_interaction::{load_settings, Editor, EditorSettings, GraphStore, InputEvent, Modifiers};
use tracing_subscriber::EnvFilter;

fn press(x: f32, y: f32) -> WindowEvent {
    WindowEvent::PointerPressed {
        position: LogicalPosition::new(x, y),
        button: PointerEventButton::Left,
    }
}

fn release(x: f32, y: f32) -> WindowEvent {
    WindowEvent::PointerReleased {
        position: LogicalPosition::new(x, y),
        button: PointerEventButton::Left,
    }
}

fn print_graph(editor: &Editor, label: &str) {
    let graph = editor.surfaces().graph.borrow();
    println!("-- {label}");
    for node in graph.nodes() {
        println!("   node {} '{}' at ({:.0}, {:.0})", node.id, node.title, node.x, node.y);
    }
    for c in graph.connections() {
        println!("   connection {}: {} -> {}", c.id, c.source, c.target);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => match load_settings(&path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        None => EditorSettings::default(),
    };
    let editor = Editor::new(settings);

    for (kind, x) in [("source", 0.0), ("filter", 250.0), ("sink", 500.0)] {
        let result = editor
            .execute("node.add", json!({ "kind": kind, "x": x, "y": 100.0 }))
            .await;
        if !result.success {
            tracing::error!(error = result.error_message(), "could not add node");
        }
    }
    editor.execute("connection.add", json!({ "source": 1, "target": 2 })).await;
    editor.execute("connection.add", json!({ "source": 2, "target": 3 })).await;
    print_graph(&editor, "initial graph");

    // Drag the filter node down by 120px
    let mut time_ms = 0;
    for event in [press(300.0, 140.0), release(300.0, 260.0)] {
        editor.handle_window_event(&event, time_ms).await;
        time_ms += 50;
    }
    print_graph(&editor, "after drag");

    // Double click on empty canvas adds a node
    time_ms += 1000;
    for event in [press(200.0, 400.0), release(200.0, 400.0), press(200.0, 400.0), release(200.0, 400.0)] {
        editor.handle_window_event(&event, time_ms).await;
        time_ms += 60;
    }
    print_graph(&editor, "after double click");

    // Select the sink and delete it with the keyboard
    editor.handle_window_event(&press(550.0, 140.0), time_ms).await;
    editor.handle_window_event(&release(550.0, 140.0), time_ms + 40).await;
    let delete = WindowEvent::KeyPressed {
        text: Key::Delete.into(),
    };
    editor.handle_window_event(&delete, time_ms + 100).await;
    print_graph(&editor, "after delete");

    for _ in 0..2 {
        editor.handle_input(&InputEvent::key_down("z", Modifiers::control())).await;
    }
    print_graph(&editor, "after two undos");

    editor.handle_input(&InputEvent::key_down("y", Modifiers::control())).await;
    print_graph(&editor, "after redo");

    let history = editor.executor().history();
    let history = history.borrow();
    println!("history: {} undoable, {} redoable", history.undo_len(), history.redo_len());
}
