use futures::Stream;
use optimist_engine::{Resource, StoreState};
use tokio::sync::watch;

/// A derived view of one slice of a store's state.
///
/// Wakes its owner only when the selected value actually changes, so a view
/// watching `flags().deleting` is not woken by an unrelated fetch.
pub struct Selector<R: Resource, T, F> {
    rx: watch::Receiver<StoreState<R>>,
    select: F,
    last: T,
}

impl<R, T, F> Selector<R, T, F>
where
    R: Resource,
    T: Clone + PartialEq,
    F: Fn(&StoreState<R>) -> T,
{
    pub(crate) fn new(mut rx: watch::Receiver<StoreState<R>>, select: F) -> Self {
        let last = select(&rx.borrow_and_update());
        Self { rx, select, last }
    }

    /// The current value of the slice.
    pub fn get(&self) -> T {
        (self.select)(&self.rx.borrow())
    }

    /// Wait for the slice to change and return its new value.
    ///
    /// Returns `None` once every handle to the store is gone.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            let next = (self.select)(&self.rx.borrow_and_update());
            if next != self.last {
                self.last = next.clone();
                return Some(next);
            }
        }
    }

    /// Every distinct value of the slice, starting with changes after now.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self, |mut selector| async move {
            let next = selector.changed().await?;
            Some((next, selector))
        })
    }
}
