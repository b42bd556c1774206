// tests/shutdown_signal.rs
//
// SIGTERM must reach the shutdown channel instead of killing the process.
// Own test binary: the signal is process-wide.
#![cfg(unix)]

use std::{process::Command, time::Duration};

use aircraft_archiver::shutdown::ShutdownSignal;
use serial_test::serial;
use tokio::{sync::watch, time::timeout};

fn send_sigterm_to_self() {
    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .expect("running kill");
    assert!(status.success());
}

#[tokio::test]
#[serial]
async fn sigterm_is_reported_by_recv() {
    let mut signals = ShutdownSignal::install().unwrap();
    send_sigterm_to_self();
    let which = timeout(Duration::from_secs(5), signals.recv())
        .await
        .expect("SIGTERM not observed");
    assert_eq!(which, "SIGTERM");
}

#[tokio::test]
#[serial]
async fn sigterm_flips_the_shutdown_channel() {
    let signals = ShutdownSignal::install().unwrap();
    let (tx, mut rx) = watch::channel(false);
    let forwarder = tokio::spawn(signals.forward(tx));

    send_sigterm_to_self();
    timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("shutdown not forwarded")
        .unwrap();
    assert!(*rx.borrow());
    forwarder.await.unwrap();
}
