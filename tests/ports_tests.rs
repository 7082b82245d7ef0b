use portsweep::config::ScanConfig;
use portsweep::ports::PortRange;
use portsweep::ScanError;

#[test]
fn range_iterates_every_port_once() {
    let range = PortRange::new(20, 25).expect("valid range");
    assert_eq!(range.len(), 6);
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![20, 21, 22, 23, 24, 25]);
}

#[test]
fn reversed_range_is_invalid_request() {
    let cfg = ScanConfig {
        start: 5000,
        end: 1,
        ..ScanConfig::for_host("127.0.0.1")
    };
    let err = cfg.validate().unwrap_err();
    assert_eq!(err, ScanError::InvalidRange { start: 5000, end: 1 });
    assert!(err.is_invalid_request());
}

#[test]
fn end_above_65535_is_invalid_request() {
    let cfg = ScanConfig {
        start: 1,
        end: 65536,
        ..ScanConfig::for_host("127.0.0.1")
    };
    assert!(matches!(cfg.validate(), Err(ScanError::InvalidRange { .. })));
}

#[test]
fn zero_start_is_invalid_request() {
    let cfg = ScanConfig {
        start: 0,
        ..ScanConfig::for_host("127.0.0.1")
    };
    assert!(cfg.validate().is_err());
}
