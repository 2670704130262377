// End-to-end export/import through both writer and reader variants.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs::File;
    use std::io::Cursor;

    use backup_core::compression::{padded_size, PaddingPolicy};
    use backup_core::constants::{AES_BLOCK_LEN, IV_LEN, MAC_LEN};
    use backup_core::crypto::{CryptoError, KeyDeriver, MessageBackupKey};
    use backup_core::proto::{frame, BackupInfo, Frame};
    use backup_core::stream::{
        AppendFnSink, BackupExportWriter, BackupImportReader, EncryptedBackupReader,
        EncryptedBackupWriter, PlainTextBackupReader, PlainTextBackupWriter, ReaderConfig,
        StateError, WriterConfig, WriterState,
    };
    use backup_core::BackupError;
    use hkdf::Hkdf;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn key() -> MessageBackupKey {
        MessageBackupKey::new([7u8; 32], [9u8; 32])
    }

    fn header() -> BackupInfo {
        BackupInfo { version: 1, ..Default::default() }
    }

    fn frames() -> Vec<Frame> {
        vec![
            Frame::recipient(1),
            Frame::chat(1, 1),
            Frame::chat(2, 1),
            Frame::text_message(1, 1, 1_700_000_000_000, "hello"),
            Frame::sticker_pack(vec![1; 16], vec![2; 32]),
        ]
    }

    fn export_plain(frames: &[Frame]) -> Vec<u8> {
        let mut w = PlainTextBackupWriter::new(Vec::new());
        w.write_header(&header()).unwrap();
        for f in frames {
            w.write_frame(f).unwrap();
        }
        w.into_inner().unwrap()
    }

    fn export_encrypted(frames: &[Frame], config: &WriterConfig) -> Vec<u8> {
        let mut w = EncryptedBackupWriter::new(Vec::new(), &key(), config).unwrap();
        w.write_header(&header()).unwrap();
        for f in frames {
            w.write_frame(f).unwrap();
        }
        w.into_inner().unwrap()
    }

    struct HkdfDeriver;

    impl KeyDeriver for HkdfDeriver {
        fn derive(&self, master_key: &[u8], account_id: &[u8]) -> Result<MessageBackupKey, CryptoError> {
            let hk = Hkdf::<Sha256>::new(Some(account_id), master_key);
            let mut okm = [0u8; 64];
            hk.expand(b"backup stream keys", &mut okm)
                .map_err(|e| CryptoError::Derivation(e.to_string()))?;
            MessageBackupKey::from_derived(&okm)
        }
    }

// # Plaintext

    #[test]
    fn plaintext_header_and_two_chats() {
        init_logging();
        let chats = vec![Frame::chat(1, 10), Frame::chat(2, 20)];
        let wire = export_plain(&chats);

        // varint(2) ++ { field 1 = 1 }
        assert_eq!(&wire[..3], &[0x02, 0x08, 0x01]);

        let mut r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(wire)).unwrap();
        assert_eq!(r.header().map(|h| h.version), Some(1));

        assert!(r.has_next());
        assert_eq!(r.next_frame().unwrap(), chats[0]);
        assert!(r.has_next());
        assert_eq!(r.next_frame().unwrap(), chats[1]);
        assert!(!r.has_next());
        assert!(matches!(r.next_frame(), Err(BackupError::NoSuchElement)));
        assert_eq!(r.counters().frames_data, 2);
    }

    #[test]
    fn plaintext_empty_stream_has_no_header() {
        let mut r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(Vec::new())).unwrap();
        assert!(r.header().is_none());
        assert!(!r.has_next());
        assert!(matches!(r.next_frame(), Err(BackupError::NoSuchElement)));
    }

    #[test]
    fn plaintext_header_only_stream() {
        let wire = export_plain(&[]);
        let r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(wire)).unwrap();
        assert_eq!(r.header(), Some(&header()));
        assert!(!r.has_next());
    }

    #[test]
    fn plaintext_truncation_surfaces_after_last_good_frame() {
        let all = frames();
        let mut wire = export_plain(&all);
        wire.truncate(wire.len() - 3);

        let mut r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(wire)).unwrap();
        for expected in &all[..all.len() - 1] {
            assert_eq!(&r.next_frame().unwrap(), expected);
        }
        assert!(r.has_next());
        let err = r.next_frame().unwrap_err();
        assert!(err.is_truncation(), "{}", err);
        assert!(!r.has_next());
    }

    #[test]
    fn plaintext_truncated_header_fails_open() {
        let wire = export_plain(&[]);
        let opened: backup_core::Result<PlainTextBackupReader<_>> =
            PlainTextBackupReader::new(Cursor::new(wire[..2].to_vec()));
        assert!(opened.err().map(|e| e.is_truncation()).unwrap_or(false));
    }

    #[test]
    fn reader_iterates_frames() {
        let all = frames();
        let r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(export_plain(&all))).unwrap();
        let got: Vec<Frame> = r.collect::<Result<_, _>>().unwrap();
        assert_eq!(got, all);
    }

    #[test]
    fn reader_close_is_idempotent() {
        let mut r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(export_plain(&frames()))).unwrap();
        r.close();
        r.close();
        assert!(!r.has_next());
        assert!(r.header().is_some());
    }

    #[test]
    fn oversized_frame_is_a_decode_error() {
        let big = vec![Frame::text_message(1, 1, 1, &"x".repeat(4096))];
        let wire = export_plain(&big);
        let config = ReaderConfig { max_record_len: 1024, ..Default::default() };

        let mut r: PlainTextBackupReader<_> = PlainTextBackupReader::with_config(Cursor::new(wire), &config).unwrap();
        assert!(r.has_next());
        let err = r.next_frame().unwrap_err();
        assert!(matches!(err, BackupError::Frame(_)));
        assert!(!err.is_truncation());
    }

    #[test]
    fn malformed_frame_is_a_decode_error() {
        let mut wire = export_plain(&[Frame::chat(1, 1)]);
        // varint(1) ++ lone continuation byte
        wire.extend_from_slice(&[0x01, 0xff]);

        let mut r: PlainTextBackupReader<_> = PlainTextBackupReader::new(Cursor::new(wire)).unwrap();
        assert_eq!(r.next_frame().unwrap(), Frame::chat(1, 1));
        let err = r.next_frame().unwrap_err();
        assert!(err.is_decode(), "{}", err);
    }

// # Writer state machine

    #[test]
    fn frame_before_header_is_rejected() {
        let mut w = PlainTextBackupWriter::new(Vec::new());
        let err = w.write_frame(&Frame::chat(1, 1)).unwrap_err();
        assert!(matches!(err, BackupError::State(StateError::HeaderNotWritten)));
        assert_eq!(w.state(), WriterState::Created);
    }

    #[test]
    fn second_header_is_rejected() {
        let mut w = EncryptedBackupWriter::new(Vec::new(), &key(), &WriterConfig::default()).unwrap();
        w.write_header(&header()).unwrap();
        let err = w.write_header(&header()).unwrap_err();
        assert!(matches!(err, BackupError::State(StateError::HeaderAlreadyWritten)));
    }

    #[test]
    fn close_before_header_is_rejected() {
        let mut w = EncryptedBackupWriter::new(Vec::new(), &key(), &WriterConfig::default()).unwrap();
        let err = w.close().unwrap_err();
        assert!(matches!(err, BackupError::State(StateError::HeaderNotWritten)));
    }

    #[test]
    fn close_twice_is_a_no_op_and_writes_after_close_fail() {
        let mut w = EncryptedBackupWriter::new(Vec::new(), &key(), &WriterConfig::default()).unwrap();
        w.write_header(&header()).unwrap();
        w.close().unwrap();
        w.close().unwrap();
        assert_eq!(w.state(), WriterState::Closed);

        let err = w.write_frame(&Frame::chat(1, 1)).unwrap_err();
        assert!(matches!(err, BackupError::State(StateError::Closed)));
    }

// # Encrypted

    #[test]
    fn encrypted_roundtrip() {
        init_logging();
        let all = frames();
        let wire = export_encrypted(&all, &WriterConfig::default());

        let mut r: EncryptedBackupReader<_> = EncryptedBackupReader::new(Cursor::new(wire), &key()).unwrap();
        assert_eq!(r.header(), Some(&header()));
        let mut got = Vec::new();
        while r.has_next() {
            got.push(r.next_frame().unwrap());
        }
        assert_eq!(got, all);
        assert_eq!(got[1].kind(), "chat");
        assert!(matches!(
            got[3].item,
            Some(frame::Item::ChatItem(ref item)) if item.standard_message.as_ref().map(|m| m.text.as_str()) == Some("hello")
        ));
    }

    #[test]
    fn encrypted_header_only_roundtrip() {
        let wire = export_encrypted(&[], &WriterConfig::default());
        let r: EncryptedBackupReader<_> = EncryptedBackupReader::new(Cursor::new(wire), &key()).unwrap();
        assert_eq!(r.header(), Some(&header()));
        assert!(!r.has_next());
    }

    #[test]
    fn encrypted_layout_is_iv_ciphertext_mac() {
        let iv = [0x5a; IV_LEN];
        let config = WriterConfig::new(None, Some(PaddingPolicy::Disabled));
        let mut w = EncryptedBackupWriter::with_iv(Vec::new(), &key(), iv, &config).unwrap();
        w.write_header(&header()).unwrap();
        w.write_frame(&Frame::chat(1, 1)).unwrap();
        w.close().unwrap();
        let counters = w.counters().clone();
        let wire = w.into_inner().unwrap();

        assert_eq!(&wire[..IV_LEN], &iv);
        assert_eq!((wire.len() - IV_LEN - MAC_LEN) % 16, 0);

        let body = &wire[..wire.len() - MAC_LEN];
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key().mac_key()).unwrap();
        mac.update(body);
        assert_eq!(&wire[wire.len() - MAC_LEN..], &mac.finalize().into_bytes()[..]);

        assert_eq!(counters.frames_header, 1);
        assert_eq!(counters.frames_data, 1);
        assert_eq!(counters.bytes_padding, 0);
        assert_eq!(counters.bytes_output(), wire.len() as u64);
    }

    #[test]
    fn bucketed_padding_hides_small_differences() {
        let config = WriterConfig::new(Some(6), Some(PaddingPolicy::Bucketed));
        let a = export_encrypted(&[Frame::chat(1, 1)], &config);
        let b = export_encrypted(&[Frame::chat(1, 1), Frame::chat(2, 1)], &config);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn randomized_padding_still_decodes() {
        let all = frames();
        for _ in 0..8 {
            let wire = export_encrypted(&all, &WriterConfig::default());
            let r: EncryptedBackupReader<_> = EncryptedBackupReader::new(Cursor::new(wire), &key()).unwrap();
            assert_eq!(r.collect::<Result<Vec<_>, _>>().unwrap(), all);
        }
    }

    #[test]
    fn randomized_padding_varies_length_within_bucket() {
        let many: Vec<Frame> = (0..2000u64)
            .map(|i| Frame::text_message(i % 50, 1, 1_700_000_000_000 + i, &format!("message {}", i)))
            .collect();
        let block = AES_BLOCK_LEN as u64;
        let cbc_len = |plain: u64| (plain / block + 1) * block;

        let mut lengths = HashSet::new();
        let mut compressed = None;
        for _ in 0..20 {
            let mut w = EncryptedBackupWriter::new(Vec::new(), &key(), &WriterConfig::default()).unwrap();
            w.write_header(&header()).unwrap();
            for f in &many {
                w.write_frame(f).unwrap();
            }
            w.close().unwrap();
            let c = w.counters().bytes_compressed;
            let wire = w.into_inner().unwrap();

            // Gzip output is deterministic; only the padding moves.
            assert_eq!(*compressed.get_or_insert(c), c);

            let len = wire.len() as u64;
            let overhead = (IV_LEN + MAC_LEN) as u64;
            assert!(len >= overhead + cbc_len(c), "len {} compressed {}", len, c);
            assert!(len <= overhead + cbc_len(padded_size(c + 1)), "len {} compressed {}", len, c);
            assert_eq!((len - overhead) % block, 0);

            let r: EncryptedBackupReader<_> = EncryptedBackupReader::new(Cursor::new(wire), &key()).unwrap();
            assert_eq!(r.collect::<Result<Vec<_>, _>>().unwrap(), many);
            lengths.insert(len);
        }
        assert!(lengths.len() > 1, "20 exports gave one length: {:?}", lengths);
    }

    #[test]
    fn encrypted_empty_input_is_too_short() {
        let opened: backup_core::Result<EncryptedBackupReader<_>> =
            EncryptedBackupReader::new(Cursor::new(Vec::new()), &key());
        assert!(matches!(
            opened.err(),
            Some(BackupError::Crypto(CryptoError::StreamTooShort { len: 0, .. }))
        ));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let wire = export_encrypted(&frames(), &WriterConfig::default());
        let other = MessageBackupKey::new([7u8; 32], [8u8; 32]);
        let opened: backup_core::Result<EncryptedBackupReader<_>> =
            EncryptedBackupReader::new(Cursor::new(wire), &other);
        assert!(opened.err().map(|e| e.is_authentication()).unwrap_or(false));
    }

    #[test]
    fn append_callback_receives_only_the_mac() {
        let mut tail = Vec::new();
        let sink = AppendFnSink::new(Vec::new(), |bytes: &[u8]| {
            tail.extend_from_slice(bytes);
            Ok(())
        });

        let mut w = EncryptedBackupWriter::new(sink, &key(), &WriterConfig::default()).unwrap();
        w.write_header(&header()).unwrap();
        w.write_frame(&Frame::chat(1, 1)).unwrap();
        let (mut body, append) = w.into_inner().unwrap().into_parts();
        drop(append);

        assert_eq!(tail.len(), MAC_LEN);
        body.extend_from_slice(&tail);

        let r: EncryptedBackupReader<_> = EncryptedBackupReader::new(Cursor::new(body), &key()).unwrap();
        assert_eq!(r.collect::<Result<Vec<_>, _>>().unwrap(), vec![Frame::chat(1, 1)]);
    }

    #[test]
    fn file_sink_roundtrip() {
        let path = std::env::temp_dir().join(format!("backup-core-{}.bin", std::process::id()));
        let all = frames();

        {
            let file = File::create(&path).unwrap();
            let mut w = EncryptedBackupWriter::new(file, &key(), &WriterConfig::default()).unwrap();
            w.write_header(&header()).unwrap();
            for f in &all {
                w.write_frame(f).unwrap();
            }
            w.close().unwrap();
        }

        let r: EncryptedBackupReader<_> = EncryptedBackupReader::new(File::open(&path).unwrap(), &key()).unwrap();
        let got = r.collect::<Result<Vec<_>, _>>();
        let _ = std::fs::remove_file(&path);
        assert_eq!(got.unwrap(), all);
    }

// # Key derivation

    #[test]
    fn master_key_roundtrip_and_account_binding() {
        let master = [0x42u8; 32];
        let config = WriterConfig::default();

        let mut w = EncryptedBackupWriter::from_master_key(Vec::new(), &HkdfDeriver, &master, b"account-a", &config).unwrap();
        w.write_header(&header()).unwrap();
        w.write_frame(&Frame::chat(9, 9)).unwrap();
        let wire = w.into_inner().unwrap();

        let r: EncryptedBackupReader<_> = EncryptedBackupReader::from_master_key(
            Cursor::new(wire.clone()),
            &HkdfDeriver,
            &master,
            b"account-a",
            &ReaderConfig::default(),
        )
        .unwrap();
        assert_eq!(r.collect::<Result<Vec<_>, _>>().unwrap(), vec![Frame::chat(9, 9)]);

        let opened: backup_core::Result<EncryptedBackupReader<_>> = EncryptedBackupReader::from_master_key(
            Cursor::new(wire),
            &HkdfDeriver,
            &master,
            b"account-b",
            &ReaderConfig::default(),
        );
        assert!(opened.err().map(|e| e.is_authentication()).unwrap_or(false));
    }

    #[test]
    fn closure_deriver_errors_propagate() {
        let failing = |_: &[u8], _: &[u8]| -> Result<MessageBackupKey, CryptoError> {
            Err(CryptoError::Derivation("no master key".into()))
        };
        let opened = EncryptedBackupWriter::from_master_key(Vec::new(), &failing, &[], &[], &WriterConfig::default());
        assert!(matches!(opened.err(), Some(BackupError::Crypto(CryptoError::Derivation(_)))));
    }

// # Config

    #[test]
    fn configs_deserialize_with_defaults() {
        let w: WriterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(w, WriterConfig::default());

        let w: WriterConfig = serde_json::from_str(r#"{"padding":"bucketed"}"#).unwrap();
        assert_eq!(w.padding, PaddingPolicy::Bucketed);
        assert_eq!(w.compression_level, WriterConfig::default().compression_level);

        let r: ReaderConfig = serde_json::from_str(r#"{"max_record_len":4096}"#).unwrap();
        assert_eq!(r.max_record_len, 4096);
        assert_eq!(r.buffer_len, ReaderConfig::default().buffer_len);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad = WriterConfig { compression_level: 12, ..Default::default() };
        assert!(matches!(
            EncryptedBackupWriter::new(Vec::new(), &key(), &bad).err(),
            Some(BackupError::Config(_))
        ));

        let bad = ReaderConfig { buffer_len: 0, ..Default::default() };
        let opened: backup_core::Result<PlainTextBackupReader<_>> =
            PlainTextBackupReader::with_config(Cursor::new(Vec::new()), &bad);
        assert!(matches!(opened.err(), Some(BackupError::Config(_))));
    }
}
