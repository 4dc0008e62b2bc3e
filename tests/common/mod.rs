//! Shared fixtures for the end-to-end `PeerConnection` tests: every test
//! needs a real (if throwaway) DTLS certificate on disk, since
//! `PeerConnection::new` computes the local fingerprint eagerly.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509, X509Name};
use rustyrtc::config::Config;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn generate_self_signed_pem() -> (String, String) {
    let rsa = Rsa::generate(2048).expect("generate rsa key");
    let pkey = PKey::from_rsa(rsa).expect("wrap rsa key");

    let mut name_builder = X509Name::builder().expect("name builder");
    name_builder
        .append_entry_by_text("CN", "rustyrtc-test")
        .expect("append CN");
    let name = name_builder.build();

    let mut builder = X509::builder().expect("x509 builder");
    builder.set_version(2).expect("set version");

    let mut serial = BigNum::new().expect("bignum");
    serial.rand(64, MsbOption::MAYBE_ZERO, false).expect("rand serial");
    let serial = serial.to_asn1_integer().expect("serial to asn1");
    builder.set_serial_number(&serial).expect("set serial");
    builder.set_subject_name(&name).expect("set subject");
    builder.set_issuer_name(&name).expect("set issuer");
    builder.set_pubkey(&pkey).expect("set pubkey");
    builder
        .set_not_before(&Asn1Time::days_from_now(0).expect("not_before"))
        .expect("set not_before");
    builder
        .set_not_after(&Asn1Time::days_from_now(7).expect("not_after"))
        .expect("set not_after");
    builder
        .append_extension(BasicConstraints::new().critical().build().expect("basic constraints"))
        .expect("append basic constraints");
    builder.sign(&pkey, MessageDigest::sha256()).expect("sign cert");
    let cert = builder.build();

    let cert_pem = String::from_utf8(cert.to_pem().expect("cert to pem")).expect("utf8 cert");
    let key_pem =
        String::from_utf8(pkey.private_key_to_pem_pkcs8().expect("key to pem")).expect("utf8 key");
    (cert_pem, key_pem)
}

/// Writes a fresh self-signed cert/key pair to a throwaway directory and
/// returns a `Config` pointing `[TLS] dtls_cert`/`dtls_key` at them.
pub fn cert_config() -> Config {
    let (cert_pem, key_pem) = generate_self_signed_pem();

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("rustyrtc-test-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create cert dir");

    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert_pem).expect("write cert");
    std::fs::write(&key_path, key_pem).expect("write key");

    let mut tls = HashMap::new();
    tls.insert("dtls_cert".to_owned(), cert_path.to_string_lossy().into_owned());
    tls.insert("dtls_key".to_owned(), key_path.to_string_lossy().into_owned());

    let mut config = Config::empty();
    config.sections.insert("TLS".to_owned(), tls);
    config
}
