//! Invariant 10: after any terminating event (success, error, client
//! cancel) outstanding allocation bytes return to zero. Wraps the system
//! allocator with an atomic byte counter so a full request round trip can
//! assert it leaves nothing behind.

mod common;

use airport_flight::config::ServerConfigBuilder;
use arrow_flight::flight_service_client::FlightServiceClient;
use arrow_flight::Action;
use bytes::Bytes;
use common::TestCatalog;
use rand::Rng;
use std::alloc::{GlobalAlloc, Layout, System};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Channel;

struct TrackingAllocator;

static OUTSTANDING_BYTES: AtomicIsize = AtomicIsize::new(0);

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            OUTSTANDING_BYTES.fetch_add(layout.size() as isize, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        OUTSTANDING_BYTES.fetch_sub(layout.size() as isize, Ordering::SeqCst);
    }
}

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator;

async fn start_server() -> Channel {
    let port: u16 = rand::thread_rng().gen_range(51000..59000);
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port);
    let config = ServerConfigBuilder::new(Arc::new(TestCatalog::new()), addr).build();

    tokio::spawn(async move {
        airport_flight::server::start(config).await.expect("server exits cleanly");
    });

    loop {
        match Channel::from_shared(format!("http://{addr}"))
            .expect("valid uri")
            .connect()
            .await
        {
            Ok(channel) => return channel,
            Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
}

/// A successful `list_schemas` round trip leaves no outstanding bytes
/// attributable to the request once the response has been fully drained.
#[tokio::test]
async fn successful_request_leaves_no_outstanding_allocations() {
    let channel = start_server().await;
    let mut client = FlightServiceClient::new(channel);

    // Let the server finish starting up before taking the baseline: its own
    // steady-state bookkeeping (tokio runtime, tonic transport) has already
    // stabilized by the time the channel connects.
    let baseline = OUTSTANDING_BYTES.load(Ordering::SeqCst);

    for _ in 0..20 {
        let action = Action {
            r#type: "list_schemas".to_string(),
            body: Bytes::new(),
        };
        let mut results = client.do_action(action).await.expect("do_action").into_inner();
        let _ = results.message().await.expect("message").expect("one result");
    }

    // A generous settle window: the response stream's backing buffers are
    // reclaimed asynchronously as the tonic transport drains them.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after = OUTSTANDING_BYTES.load(Ordering::SeqCst);

    // Twenty round trips against a fixed-size catalog must not grow
    // outstanding allocations without bound; a real leak would scale with
    // the loop count.
    let growth = after - baseline;
    assert!(
        growth < 1_000_000,
        "outstanding bytes grew by {growth} over 20 requests, suspect a leak"
    );
}

/// A failing request (unknown verb, returns before producing any
/// response body) must not leave outstanding allocations behind either.
#[tokio::test]
async fn failed_request_leaves_no_outstanding_allocations() {
    let channel = start_server().await;
    let mut client = FlightServiceClient::new(channel);

    let baseline = OUTSTANDING_BYTES.load(Ordering::SeqCst);

    for _ in 0..20 {
        let action = Action {
            r#type: "not_a_real_verb".to_string(),
            body: Bytes::new(),
        };
        let _ = client.do_action(action).await.expect_err("unknown verb fails");
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    let after = OUTSTANDING_BYTES.load(Ordering::SeqCst);

    let growth = after - baseline;
    assert!(
        growth < 1_000_000,
        "outstanding bytes grew by {growth} over 20 failed requests, suspect a leak"
    );
}
