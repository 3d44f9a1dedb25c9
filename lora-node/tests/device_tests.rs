use lora_node::{
    config::{DeviceClass, NodeProfile, Param},
    device::{bring_up, dump_config, provision, SetupError},
};

mod mock;
use mock::{MockConfigApi, MockError};

fn module() -> MockConfigApi {
    MockConfigApi {
        version: Some("1.2.3".to_string()),
        fuse: Some("0011223344556677".to_string()),
        ..MockConfigApi::default()
    }
}

fn stored(api: &MockConfigApi, param: Param) -> Option<&str> {
    api.params
        .iter()
        .find(|(p, _)| *p == param)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_provision_uses_fused_dev_eui() {
    let mut api = module();
    let mut log = String::new();

    let provisioned = provision(&mut api, &NodeProfile::default(), &mut log).unwrap();

    assert_eq!(provisioned.failed_params, 0);
    assert_eq!(
        provisioned.profile.dev_eui,
        Some([0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77])
    );
    assert_eq!(stored(&api, Param::DevEui), Some("0011223344556677"));
    assert_eq!(stored(&api, Param::DevAddr), Some("44556677"));
    assert_eq!(stored(&api, Param::AppEui), Some("00000000000000ab"));
    assert_eq!(stored(&api, Param::Class), Some("3"));
    assert_eq!(stored(&api, Param::Frequency), Some("923300000"));
    assert_eq!(api.params.len(), Param::ALL.len());
}

#[test]
fn test_bring_up_dumps_config() {
    let mut api = module();
    let mut log = String::new();

    let report = bring_up(&mut api, &NodeProfile::default(), &mut log);

    assert!(report.is_clean());
    assert!(api.applied);
    assert!(api.started);
    assert_eq!(report.class, Some(DeviceClass::C));
    assert!(log.starts_with("Version=1.2.3\r\n"));
    assert!(log.contains("DevEui=0011223344556677\r\n"));
    assert!(log.contains("DevClass=3\r\n"));
    assert!(log.contains("DevAdvwiseFreq=923300000Hz\r\n"));
    assert!(log.contains("DevAdvwiseTxPwr=20dBm\r\n"));
    assert!(!log.contains("AppKey="));
}

#[test]
fn test_fuse_failure_still_starts_lora() {
    let mut api = MockConfigApi::default();
    let mut log = String::new();

    let report = bring_up(&mut api, &NodeProfile::default(), &mut log);

    assert!(report.provisioned.is_none());
    assert_eq!(report.errors.as_slice(), &[SetupError::FuseDevEui(MockError::Error)]);
    assert!(log.contains("Get fuse DevEui failed\r\n"));
    assert!(api.applied);
    assert!(api.started);
    assert_eq!(report.class, None);
}

#[test]
fn test_malformed_fuse_is_rejected() {
    let mut api = MockConfigApi {
        fuse: Some("not-hex".to_string()),
        ..MockConfigApi::default()
    };
    let mut log = String::new();

    let result = provision(&mut api, &NodeProfile::default(), &mut log);
    assert!(matches!(result, Err(SetupError::InvalidDevEui)));
    assert!(api.params.is_empty());
}

#[test]
fn test_refused_params_are_counted() {
    let mut api = module();
    api.refuse = vec![Param::TxPower, Param::DataRate];
    api.fail_apply = true;
    let mut log = String::new();

    let report = bring_up(&mut api, &NodeProfile::default(), &mut log);

    assert_eq!(report.provisioned.as_ref().map(|p| p.failed_params), Some(2));
    assert_eq!(report.errors.as_slice(), &[SetupError::Apply(MockError::Error)]);
    assert!(!report.is_clean());
    assert!(log.contains("WARN: set DevAdvwiseTxPwr failed"));
    assert!(api.started);
}

#[test]
fn test_dump_reads_class_from_module() {
    let mut api = module();
    api.params.push((Param::Class, "1".to_string()));
    let mut log = String::new();

    assert_eq!(dump_config(&mut api, &mut log), Some(DeviceClass::A));
    assert_eq!(log, "DevClass=1\r\n");
}
