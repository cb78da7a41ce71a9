//! Helpers shared by unit tests.

/// Initialize the slint testing backend once per test thread.
///
/// Timers created by the long-press recognizer need a platform; with
/// `init_no_event_loop` every test thread gets its own, and
/// `mock_elapsed_time` drives them deterministically.
pub(crate) fn init_testing_backend() {
    use std::cell::Cell;
    thread_local! {
        static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    }

    INITIALIZED.with(|init| {
        if !init.get() {
            i_slint_backend_testing::init_no_event_loop();
            init.set(true);
        }
    });
}
