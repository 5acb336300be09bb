//! Error reporting at public entry points.
//!
//! The wrappers here log a failing call once, with the callable's
//! module-qualified name and the arguments it was called with, and hand the
//! error back untouched. They never change control flow.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

/// Wrap `f` so that any error it returns is logged before being returned.
pub fn instrument<A, T, E, F>(callable: &'static str, f: F) -> impl Fn(A) -> Result<T, E>
where
    A: fmt::Debug,
    E: StdError,
    F: Fn(A) -> Result<T, E>,
{
    move |args: A| {
        let rendered = format!("{args:?}");
        f(args).inspect_err(|error| report(callable, &rendered, error))
    }
}

/// Await `fut`, logging its error together with `args` if it fails.
pub async fn observe<T, E, Fut>(callable: &'static str, args: impl fmt::Debug, fut: Fut) -> Result<T, E>
where
    E: StdError,
    Fut: Future<Output = Result<T, E>>,
{
    fut.await
        .inspect_err(|error| report(callable, &format!("{args:?}"), error))
}

fn report(callable: &str, args: &str, error: &dyn StdError) {
    tracing::error!(callable, args, error = %error, "call failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }

        fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
            let writer = self.clone();
            tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .finish()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] io::Error);

    #[test]
    fn success_passes_through_silently() {
        let logs = Captured::default();
        let double = instrument("tests::double", |x: i32| Ok::<_, io::Error>(x * 2));

        let out = tracing::subscriber::with_default(logs.subscriber(), || double(21));
        assert_eq!(out.unwrap(), 42);
        assert!(logs.text().is_empty());
    }

    #[test]
    fn error_is_returned_unchanged_and_logged_once() {
        let logs = Captured::default();
        let failing = instrument("tests::failing", |name: &str| {
            Err::<(), _>(Outer(io::Error::new(io::ErrorKind::NotFound, format!("{name} missing"))))
        });

        let err = tracing::subscriber::with_default(logs.subscriber(), || failing("daily")).unwrap_err();
        assert_eq!(err.0.kind(), io::ErrorKind::NotFound);

        let text = logs.text();
        assert_eq!(text.matches("call failed").count(), 1);
        assert!(text.contains("tests::failing"));
        assert!(text.contains("daily"));
        assert!(text.contains("error=outer failure"));
    }

    #[tokio::test]
    async fn observe_reports_async_failures() {
        let logs = Captured::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let ok: Result<u8, io::Error> = observe("tests::ok", (), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);
        assert!(logs.text().is_empty());

        let err: Result<u8, io::Error> = observe("tests::broken", ("nightly", 3), async {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        })
        .await;
        assert_eq!(err.unwrap_err().to_string(), "boom");

        let text = logs.text();
        assert!(text.contains("tests::broken"));
        assert!(text.contains("nightly"));
    }
}
