use netlify_functions::{Context, Error, Request, Response};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // state that persists between invocations within one process instance
    let counter = Arc::new(AtomicUsize::new(0));

    netlify_functions::start(move |_: Request, _: Context| {
        let counter = Arc::clone(&counter);
        async move {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            Response::text(format!("{}", count))
        }
    })
    .await
}
