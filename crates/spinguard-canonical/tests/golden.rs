use spinguard_canonical::{
    validate, Canonicalizer, FingerprintHasher, HashError, IdentityToken, RawFingerprint,
    ServerSecret,
};

fn desktop() -> RawFingerprint {
    RawFingerprint {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15".into(),
        platform: " MacIntel ".into(),
        language: "EN-us".into(),
        time_zone: " Europe/Paris ".into(),
        screen_width: 1440,
        screen_height: 900,
        color_depth: 30,
        hardware_concurrency: Some(8),
        device_memory: None,
        max_touch_points: 0,
        canvas_fingerprint: "data:image/png;base64,AAAABBBB".into(),
    }
}

/// 400x800 screen with a 60 character user agent.
fn scenario_phone() -> RawFingerprint {
    let user_agent = "Mozilla/5.0 (Linux; Android 13; SM-A536B) AppleWebKit/537.36".to_string();
    assert_eq!(user_agent.len(), 60);
    RawFingerprint {
        user_agent,
        platform: "Linux armv81".into(),
        language: "vi".into(),
        time_zone: "Asia/Ho_Chi_Minh".into(),
        screen_width: 400,
        screen_height: 800,
        color_depth: 24,
        hardware_concurrency: None,
        device_memory: Some(4.0),
        max_touch_points: 5,
        canvas_fingerprint: "data:image/png;base64,CANVASCANVAS".into(),
    }
}

#[test]
fn canonical_bytes_are_sorted_and_stringified() {
    let canonicalizer = Canonicalizer::new();
    let canonical = canonicalizer.canonicalize(&desktop());
    let bytes = canonicalizer.to_canonical_bytes(&canonical).unwrap();

    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        concat!(
            r#"{"canvasFingerprint":"data:image/png;base64,AAAABBBB","colorDepth":"30","#,
            r#""deviceMemory":"0","hardwareConcurrency":"8","language":"en-us","#,
            r#""maxTouchPoints":"0","platform":"macintel","resolution":"900x1440","#,
            r#""systemInfo":"Macintosh; Intel Mac OS X 10.15","timeZone":"Europe/Paris"}"#
        )
    );
}

#[test]
fn hashing_is_deterministic() {
    let hasher = FingerprintHasher::new(ServerSecret::new("S"));
    let first = hasher.identify(&desktop()).unwrap();
    for _ in 0..10 {
        assert_eq!(hasher.identify(&desktop()).unwrap(), first);
    }
}

#[test]
fn orientation_does_not_change_canonical_form() {
    let canonicalizer = Canonicalizer::new();
    let portrait = scenario_phone();
    let landscape = RawFingerprint {
        screen_width: portrait.screen_height,
        screen_height: portrait.screen_width,
        ..portrait.clone()
    };
    assert_eq!(
        canonicalizer.canonicalize(&portrait),
        canonicalizer.canonicalize(&landscape)
    );
}

#[test]
fn patch_version_does_not_change_system_info() {
    let canonicalizer = Canonicalizer::new();
    let a = RawFingerprint {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 15_4_1 like Mac OS X) AppleWebKit".into(),
        ..scenario_phone()
    };
    let b = RawFingerprint {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 15_4_3 like Mac OS X) AppleWebKit".into(),
        ..scenario_phone()
    };
    assert_eq!(
        canonicalizer.canonicalize(&a).system_info,
        canonicalizer.canonicalize(&b).system_info
    );
}

#[test]
fn distinct_devices_hash_differently() {
    let hasher = FingerprintHasher::new(ServerSecret::new("S"));
    let other = RawFingerprint {
        canvas_fingerprint: "data:image/png;base64,DIFFERENTCANVAS".into(),
        ..desktop()
    };
    assert_ne!(
        hasher.identify(&desktop()).unwrap(),
        hasher.identify(&other).unwrap()
    );
}

#[test]
fn secret_changes_the_token() {
    let a = FingerprintHasher::new(ServerSecret::new("S")).identify(&desktop()).unwrap();
    let b = FingerprintHasher::new(ServerSecret::new("T")).identify(&desktop()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn scenario_phone_yields_stable_hex_token() {
    let raw = scenario_phone();
    assert!(validate(&raw).is_ok());

    let hasher = FingerprintHasher::new(ServerSecret::new("S"));
    let canonical = hasher.canonicalizer().canonicalize(&raw);
    assert_eq!(canonical.resolution, (400, 800));
    assert_eq!(canonical.hardware_concurrency, 0);
    assert_eq!(canonical.device_memory, "4");

    let token = hasher.hash(&canonical).unwrap();
    assert_eq!(token.as_str().len(), 64);
    assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(IdentityToken::parse(token.as_str()).unwrap(), token);
    assert_eq!(hasher.identify(&raw).unwrap(), token);
}

#[test]
fn implausible_fingerprint_is_rejected_before_hashing() {
    let hasher = FingerprintHasher::new(ServerSecret::new("S"));
    let err = hasher.identify(&RawFingerprint::default()).unwrap_err();
    assert!(matches!(err, HashError::Rejected(_)));
}
