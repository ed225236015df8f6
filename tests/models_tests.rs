// Probe result derivation and snapshot serialization tests

mod common;

use chrono::Local;
use common::{connectivity_result, lease_result};
use nocwatch::aggregator::Aggregator;
use nocwatch::models::*;
use std::time::Duration;

#[test]
fn lease_renewal_success_requires_renewal_ipv4_and_latency() {
    assert!(lease_result(true, true, 15).success());
    assert!(!lease_result(true, false, 15).success());
    assert!(!lease_result(false, true, 15).success());
    assert!(!lease_result(true, true, 0).success());
}

#[test]
fn connectivity_success_requires_ipv4_and_measured_latency() {
    assert!(connectivity_result(true, true, 15).success());
    assert!(connectivity_result(true, false, 15).success());
    assert!(!connectivity_result(true, true, 0).success());
    assert!(!connectivity_result(false, true, 15).success());
}

#[test]
fn lease_duration_only_present_for_lease_renewal() {
    let lease = lease_result(true, true, 15);
    assert_eq!(lease.kind(), ProbeKind::LeaseRenewal);
    assert_eq!(lease.lease_renew_duration(), Some(Duration::from_millis(2500)));

    let ping = connectivity_result(true, true, 15);
    assert_eq!(ping.kind(), ProbeKind::Connectivity);
    assert_eq!(ping.lease_renew_duration(), None);
}

#[test]
fn failed_lease_outcome_has_zero_duration() {
    let r = ProbeResult::lease_renewal(
        LeaseOutcome::failed(),
        true,
        true,
        Duration::from_millis(15),
        Local::now(),
    );
    assert!(!r.success());
    assert_eq!(r.lease_renew_duration(), Some(Duration::ZERO));
}

#[test]
fn probe_kind_labels() {
    assert_eq!(ProbeKind::LeaseRenewal.label(), "DHCP");
    assert_eq!(ProbeKind::Connectivity.label(), "Ping");
}

#[test]
fn probe_result_serializes_camel_case_with_millis() {
    let json = serde_json::to_value(lease_result(true, true, 15)).unwrap();
    assert_eq!(json["kind"], "leaseRenewal");
    assert_eq!(json["leaseRenewMs"], 2500.0);
    assert_eq!(json["latencyMs"], 15.0);
    assert_eq!(json["ipv4Reachable"], true);
    assert_eq!(json["success"], true);

    let json = serde_json::to_value(connectivity_result(true, false, 15)).unwrap();
    assert!(json["leaseRenewMs"].is_null());
}

#[test]
fn snapshot_serializes_totals_and_windows() {
    let mut agg = Aggregator::new();
    agg.record(connectivity_result(true, true, 20));
    let json = serde_json::to_value(agg.snapshot()).unwrap();
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["successCount"], 1);
    assert_eq!(json["connectivitySuccessRate"], 100.0);
    assert_eq!(json["recentLease"].as_array().unwrap().len(), 0);
    assert_eq!(json["recentConnectivity"].as_array().unwrap().len(), 1);
}

#[test]
fn snapshot_latest_is_last_of_window() {
    let mut agg = Aggregator::new();
    agg.record(connectivity_result(true, true, 10));
    agg.record(connectivity_result(false, true, 0));
    let s = agg.snapshot();
    assert_eq!(s.failure_count(), 1);
    assert!(!s.latest_connectivity().unwrap().success());
    assert!(s.latest_lease().is_none());
}
