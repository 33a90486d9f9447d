//! A uniform "maybe-later value", the way juniper leans on `futures`
//! everywhere a resolver might return something that isn't ready yet.
//!
//! `Deferred<T>` has exactly the three states a GraphQL resolver can be in —
//! *fulfilled*, *rejected*, *pending* — collapsed into two Rust variants
//! because a fulfilled-or-rejected value is just `Result::Ok`/`Result::Err`
//! already settled.

use futures::future::{BoxFuture, FutureExt};

use crate::error::ExecutionError;

/// A value of type `T` that may already be available, or may only become
/// available after polling a future to completion.
///
/// Resolvers, the middleware chain, and the output coercer all pass these
/// around instead of committing to `async fn` everywhere — a synchronous
/// resolver built with [`Deferred::ready`] never touches an executor at all.
pub enum Deferred<T> {
    Ready(Result<T, ExecutionError>),
    Pending(BoxFuture<'static, Result<T, ExecutionError>>),
}

impl<T: Send + 'static> Deferred<T> {
    /// An already-fulfilled deferred.
    pub fn ready(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    /// An already-rejected deferred.
    pub fn err(error: ExecutionError) -> Self {
        Self::Ready(Err(error))
    }

    /// Wraps a future as a pending deferred.
    pub fn pending(fut: impl std::future::Future<Output = Result<T, ExecutionError>> + Send + 'static) -> Self {
        Self::Pending(fut.boxed())
    }

    /// Awaits this deferred down to its settled `Result`.
    pub async fn resolve(self) -> Result<T, ExecutionError> {
        match self {
            Self::Ready(r) => r,
            Self::Pending(fut) => fut.await,
        }
    }

    /// Chains a continuation onto this deferred, producing a new deferred of
    /// (possibly) a different type. The continuation itself may return
    /// either an immediate or a pending deferred; either way the result
    /// flattens into a single `Deferred<U>`, never a `Deferred<Deferred<U>>`.
    pub fn then<U, F>(self, f: F) -> Deferred<U>
    where
        U: Send + 'static,
        F: FnOnce(Result<T, ExecutionError>) -> Deferred<U> + Send + 'static,
    {
        match self {
            Self::Ready(r) => f(r),
            Self::Pending(fut) => Deferred::pending(async move {
                let r = fut.await;
                f(r).resolve().await
            }),
        }
    }

    /// Runs every deferred in `items` to completion — never short-circuiting
    /// the polling, only the reported outcome — and succeeds with the list
    /// of values if every one fulfilled, or with the *first* rejection
    /// (in list order) otherwise.
    ///
    /// A rejected sibling does not stop the others from running, so any
    /// errors they push onto the shared accumulator are still collected even
    /// though only one rejection is surfaced here.
    pub fn all(items: Vec<Deferred<T>>) -> Deferred<Vec<T>> {
        Deferred::pending(async move {
            let results = futures::future::join_all(items.into_iter().map(Deferred::resolve)).await;
            let mut values = Vec::with_capacity(results.len());
            let mut first_err = None;
            for r in results {
                match r {
                    Ok(v) => values.push(v),
                    Err(e) => {
                        if first_err.is_none() {
                            first_err = Some(e);
                        }
                    }
                }
            }
            match first_err {
                Some(e) => Err(e),
                None => Ok(values),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[tokio::test]
    async fn ready_resolves_immediately() {
        let d = Deferred::ready(5);
        assert_eq!(d.resolve().await, Ok(5));
    }

    #[tokio::test]
    async fn pending_resolves_after_await() {
        let d = Deferred::pending(async { Ok(42) });
        assert_eq!(d.resolve().await, Ok(42));
    }

    #[tokio::test]
    async fn then_flattens_nested_deferreds() {
        let d = Deferred::ready(1).then(|r| {
            let n = r.unwrap();
            Deferred::pending(async move { Ok(n + 1) })
        });
        assert_eq!(d.resolve().await, Ok(2));
    }

    #[tokio::test]
    async fn all_succeeds_when_every_item_fulfills() {
        let items = vec![Deferred::ready(1), Deferred::pending(async { Ok(2) }), Deferred::ready(3)];
        assert_eq!(Deferred::all(items).resolve().await, Ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn all_runs_every_sibling_even_after_a_rejection() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let ran = Arc::new(AtomicUsize::new(0));
        let mk = |ran: Arc<AtomicUsize>, fail: bool| {
            Deferred::pending(async move {
                ran.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(ExecutionError::at_origin(FieldError::new("boom")))
                } else {
                    Ok(1)
                }
            })
        };
        let items = vec![mk(ran.clone(), true), mk(ran.clone(), false), mk(ran.clone(), false)];
        let result = Deferred::all(items).resolve().await;
        assert!(result.is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }
}
