use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::{Path, PathBuf};

use stego_secrets::common::files;
use stego_secrets::crypto::Share;
use stego_secrets::processing::steganography;
use stego_secrets::{
    Decrypter, DecrypterConfig, EncrypterConfig, Encrypter, EncryptionOutput, KeySource,
    StegoError,
};

const MESSAGE: &[u8] = b"hello world!";

/// Write `count` distinct carrier images into `dir`, alternating PNG and JPEG.
fn write_carriers(dir: &Path, count: u32) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        let img = ImageBuffer::from_fn(48, 32, |x, y| Rgb([(x * 5 + i) as u8, (y * 3) as u8, 200]));
        let ext = if i % 2 == 0 { "png" } else { "jpg" };
        img.save(dir.join(format!("carrier{}.{}", i, ext))).unwrap();
    }
}

fn encrypt(root: &Path, parts: u8, threshold: u8, carriers: u32) -> EncryptionOutput {
    let images_dir = root.join("images");
    write_carriers(&images_dir, carriers);

    let encrypter = Encrypter::new(EncrypterConfig {
        parts,
        threshold,
        output_dir: root.join("out"),
        images_dir,
    })
    .unwrap();

    encrypter.encrypt(MESSAGE, "secret").unwrap()
}

fn decrypt_with(output: &EncryptionOutput, source: KeySource) -> anyhow::Result<PathBuf> {
    Decrypter::new(DecrypterConfig::default(), source).decrypt(&output.ciphertext)
}

fn shares_from(keys: &[&PathBuf]) -> KeySource {
    KeySource::resolve(None, keys.iter().map(|p| p.to_path_buf()).collect(), vec![])
}

fn stego_error(err: &anyhow::Error) -> Option<&StegoError> {
    err.chain().find_map(|e| e.downcast_ref::<StegoError>())
}

#[test]
fn test_artifact_layout() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 3, 5);
    let out = dir.path().join("out");

    for name in ["secret.enc", "secret.enc.key", "secret.checksum", "secret.enc.checksum"] {
        assert!(out.join(name).is_file(), "{name}");
    }
    for i in 1..=5 {
        assert!(out.join(format!("{:03}.key", i)).is_file());
        assert!(out.join(format!("{:03}.png", i)).is_file());
        assert!(out.join(format!("{:03}.png.checksum", i)).is_file());
    }

    assert_eq!(output.share_keys.len(), 5);
    assert_eq!(output.share_images.len(), 5);

    let record = fs::read_to_string(out.join("secret.enc.checksum")).unwrap();
    assert!(record.ends_with("\tsecret.enc"));
}

#[test]
fn test_any_two_of_five_keys_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 2, 0);
    assert!(output.share_images.is_empty());

    for i in 0..5 {
        for j in (i + 1)..5 {
            let keys = [&output.share_keys[i], &output.share_keys[j]];
            let cleartext = decrypt_with(&output, shares_from(&keys)).unwrap();

            assert_eq!(cleartext, dir.path().join("out/secret"));
            assert_eq!(fs::read(&cleartext).unwrap(), MESSAGE);
            fs::remove_file(&cleartext).unwrap();
        }
    }
}

#[test]
fn test_single_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 2, 0);

    let err = decrypt_with(&output, shares_from(&[&output.share_keys[3]])).unwrap_err();
    assert!(matches!(
        stego_error(&err),
        Some(StegoError::InsufficientShares { have: 1, .. })
    ));
    assert!(!dir.path().join("out/secret").exists());
}

#[test]
fn test_same_key_twice_is_one_share() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 2, 0);
    let key = &output.share_keys[0];

    let err = decrypt_with(&output, shares_from(&[key, key])).unwrap_err();
    assert!(matches!(
        stego_error(&err),
        Some(StegoError::InsufficientShares { have: 1, .. })
    ));
}

#[test]
fn test_below_threshold_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 3, 0);
    let keys = [&output.share_keys[0], &output.share_keys[4]];

    let err = decrypt_with(&output, shares_from(&keys)).unwrap_err();
    assert!(matches!(
        stego_error(&err),
        Some(StegoError::InsufficientShares { have: 2, need: 3 })
    ));
}

#[test]
fn test_master_key_only() {
    for parts in [0, 1] {
        let dir = tempfile::tempdir().unwrap();
        let output = encrypt(dir.path(), parts, parts, 3);

        assert!(output.share_keys.is_empty());
        assert!(output.share_images.is_empty());
        assert!(!dir.path().join("out/001.key").exists());

        let source = KeySource::resolve(Some(output.master_key.clone()), vec![], vec![]);
        let cleartext = decrypt_with(&output, source).unwrap();
        assert_eq!(fs::read(cleartext).unwrap(), MESSAGE);
    }
}

#[test]
fn test_master_key_ignores_bogus_shares() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 3, 2, 0);

    let source = KeySource::resolve(
        Some(output.master_key.clone()),
        vec![dir.path().join("does-not-exist.key")],
        vec![dir.path().join("does-not-exist.png")],
    );
    let cleartext = decrypt_with(&output, source).unwrap();
    assert_eq!(fs::read(cleartext).unwrap(), MESSAGE);
}

#[test]
fn test_carrier_pool_is_cycled() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 3, 2);

    assert_eq!(output.share_images.len(), 5);

    for (key_path, image_path) in output.share_keys.iter().zip(&output.share_images) {
        let encoded = fs::read_to_string(key_path).unwrap();
        let expected = Share::from_base64(&encoded).unwrap();

        let carrier = files::read_file(image_path).unwrap();
        let hidden = steganography::extract_bytes(&carrier).unwrap();
        assert_eq!(Share::from_bytes(&hidden).unwrap(), expected);
    }

    // 001, 003, 005 reuse the first carrier; 002, 004 the second
    let high_bits = |p: &PathBuf| -> Vec<u8> {
        image::open(p).unwrap().to_rgb8().into_raw().iter().map(|c| c >> 1).collect()
    };
    let images = &output.share_images;
    assert_eq!(high_bits(&images[0]), high_bits(&images[2]));
    assert_eq!(high_bits(&images[0]), high_bits(&images[4]));
    assert_eq!(high_bits(&images[1]), high_bits(&images[3]));
    assert_ne!(high_bits(&images[0]), high_bits(&images[1]));
}

#[test]
fn test_decrypt_from_images_and_mixed_sources() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 5, 3, 2);
    let images = &output.share_images;

    let source = KeySource::resolve(None, vec![], images[..3].to_vec());
    assert_eq!(fs::read(decrypt_with(&output, source).unwrap()).unwrap(), MESSAGE);

    let source = KeySource::resolve(
        None,
        vec![output.share_keys[0].clone()],
        vec![images[3].clone(), images[4].clone()],
    );
    assert_eq!(fs::read(decrypt_with(&output, source).unwrap()).unwrap(), MESSAGE);
}

#[test]
fn test_tampered_ciphertext_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 0, 0, 0);

    let mut content = fs::read(&output.ciphertext).unwrap();
    let last = content.len() - 1;
    content[last] ^= 0x01;
    fs::write(&output.ciphertext, &content).unwrap();

    let source = KeySource::resolve(Some(output.master_key.clone()), vec![], vec![]);
    let err = decrypt_with(&output, source.clone()).unwrap_err();
    assert!(matches!(stego_error(&err), Some(StegoError::VerificationFailure(_))));
    assert!(!dir.path().join("out/secret").exists());

    // Without the gate the flipped bit goes straight through
    let unchecked = DecrypterConfig {
        verify_checksums: false,
    };
    let cleartext = Decrypter::new(unchecked, source)
        .decrypt(&output.ciphertext)
        .unwrap();
    let recovered = fs::read(cleartext).unwrap();
    assert_ne!(recovered, MESSAGE);
    assert_eq!(recovered.len(), MESSAGE.len());
}

#[test]
fn test_tampered_share_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = encrypt(dir.path(), 3, 2, 1);

    let record = PathBuf::from(format!("{}.checksum", output.share_images[0].display()));
    fs::write(&record, "00\t001.png").unwrap();

    let source = KeySource::resolve(None, vec![], output.share_images[..2].to_vec());
    let err = decrypt_with(&output, source).unwrap_err();
    assert!(matches!(stego_error(&err), Some(StegoError::VerificationFailure(_))));
}

#[test]
fn test_shares_from_another_split_are_caught_by_checksum() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let output = encrypt(first.path(), 3, 2, 0);
    let other = encrypt(second.path(), 3, 2, 0);

    let keys = [&other.share_keys[0], &other.share_keys[1]];
    let err = decrypt_with(&output, shares_from(&keys)).unwrap_err();
    assert!(matches!(stego_error(&err), Some(StegoError::VerificationFailure(_))));
}

#[test]
fn test_threshold_above_parts_is_configuration_error() {
    let err = Encrypter::new(EncrypterConfig {
        parts: 3,
        threshold: 5,
        ..Default::default()
    })
    .err()
    .unwrap();
    assert!(matches!(stego_error(&err), Some(StegoError::Configuration(_))));
}

#[test]
fn test_name_clashing_with_share_image_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let images_dir = dir.path().join("images");
    write_carriers(&images_dir, 1);

    let encrypter = Encrypter::new(EncrypterConfig {
        parts: 3,
        threshold: 2,
        output_dir: dir.path().join("out"),
        images_dir,
    })
    .unwrap();

    let err = encrypter.encrypt(&b"photo bytes"[..], "001.png").unwrap_err();
    assert!(matches!(stego_error(&err), Some(StegoError::Configuration(_))));
    assert!(!dir.path().join("out/001.png.checksum").exists());
    assert!(!dir.path().join("out/001.png.enc").exists());
}

#[test]
fn test_photo_name_decrypts_without_split() {
    let dir = tempfile::tempdir().unwrap();
    let encrypter = Encrypter::new(EncrypterConfig {
        output_dir: dir.path().join("out"),
        images_dir: dir.path().join("images"),
        ..Default::default()
    })
    .unwrap();

    let output = encrypter.encrypt(&b"photo bytes"[..], "001.png").unwrap();
    let source = KeySource::resolve(Some(output.master_key.clone()), vec![], vec![]);
    let cleartext = decrypt_with(&output, source).unwrap();

    assert_eq!(cleartext, dir.path().join("out/001.png"));
    assert_eq!(fs::read(cleartext).unwrap(), b"photo bytes");
}

#[test]
fn test_undersized_carrier_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    let images_dir = dir.path().join("images");
    fs::create_dir_all(&images_dir).unwrap();
    ImageBuffer::from_pixel(4, 4, Rgb([1u8, 2, 3]))
        .save(images_dir.join("tiny.png"))
        .unwrap();

    let encrypter = Encrypter::new(EncrypterConfig {
        parts: 3,
        threshold: 2,
        output_dir: dir.path().join("out"),
        images_dir,
    })
    .unwrap();

    let err = encrypter.encrypt(MESSAGE, "secret").unwrap_err();
    assert!(matches!(
        stego_error(&err),
        Some(StegoError::InsufficientCapacity { .. })
    ));

    let out = dir.path().join("out");
    assert!(out.join("001.key").is_file());
    assert!(!out.join("001.png").exists());
    assert!(!out.join("002.key").exists());
}

#[test]
fn test_empty_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let encrypter = Encrypter::new(EncrypterConfig {
        parts: 2,
        threshold: 2,
        output_dir: dir.path().join("out"),
        images_dir: dir.path().join("images"),
    })
    .unwrap();

    let output = encrypter.encrypt(&b""[..], "empty").unwrap();
    assert_eq!(fs::read(&output.ciphertext).unwrap().len(), 16);

    let source = KeySource::resolve(None, output.share_keys.clone(), vec![]);
    let cleartext = Decrypter::new(DecrypterConfig::default(), source)
        .decrypt(&output.ciphertext)
        .unwrap();
    assert!(fs::read(cleartext).unwrap().is_empty());
}
