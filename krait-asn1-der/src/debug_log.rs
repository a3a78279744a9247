//! Optional codec tracing behind the `debug_log` feature.
//!
//! Each logged call indents its nested calls by one level, per thread, so
//! the printed trace mirrors the recursion through the record being coded.

#[cfg(not(feature = "debug_log"))]
macro_rules! debug_log {
    () => {};
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug_log")]
#[macro_use]
pub mod internal {
    use lazy_static::lazy_static;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    lazy_static! {
        pub static ref INDENT: Mutex<HashMap<ThreadId, u8>> = Mutex::new(HashMap::new());
    }

    /// Bumps the current thread's indent level for as long as it lives.
    pub struct IndentGuard;

    impl IndentGuard {
        pub fn enter() -> Self {
            INDENT
                .lock()
                .unwrap()
                .entry(::std::thread::current().id())
                .and_modify(|level| *level += 1)
                .or_insert(1);
            Self
        }
    }

    impl Drop for IndentGuard {
        fn drop(&mut self) {
            INDENT
                .lock()
                .unwrap()
                .entry(::std::thread::current().id())
                .and_modify(|level| *level -= 1);
        }
    }

    macro_rules! debug_log {
        () => {
            println!("| debug  |");
        };
        ($($arg:tt)*) => {
            let level = *$crate::debug_log::internal::INDENT.lock()
                .unwrap()
                .get(&::std::thread::current().id())
                .unwrap_or(&0);
            let mut prefix = String::with_capacity(2 * usize::from(level));
            for _ in 0..level {
                prefix.push_str("| ");
            }

            print!("| debug => {}", prefix);
            println!($($arg)*);
            let _guard = $crate::debug_log::internal::IndentGuard::enter();
        };
    }
}
