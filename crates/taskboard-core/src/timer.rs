//! Runtime-neutral sleep used for simulated latency.

use std::time::Duration;

#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(duration: Duration) {
    // The timer callback is not Send, so only the receiver lives across the await.
    let (tx, rx) = futures::channel::oneshot::channel::<()>();
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::callback::Timeout::new(millis, move || {
        let _ = tx.send(());
    })
    .forget();
    let _ = rx.await;
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
