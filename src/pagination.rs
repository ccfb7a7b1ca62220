//! Draining cursor-based listings into a complete sequence

use crate::error::Result;
use std::future::Future;

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T, C> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Cursor for the following page, `None` on the last page
    pub next: Option<C>,
}

/// Fetch every page of a listing and concatenate the items.
///
/// `fetch` is called with `None` for the first page and then with each
/// returned cursor. Server order is preserved. If any page fails, the
/// items gathered so far are dropped and a transport error is returned.
pub async fn drain<T, C, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<Page<T, C>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;

    loop {
        let page = fetch(cursor.take()).await.map_err(|e| e.into_transport())?;
        items.extend(page.items);

        match page.next {
            Some(next) => cursor = Some(next),
            None => return Ok(items),
        }
    }
}
