//! BIP32 derivation and serialization tests

use coin_keys::{
    base58, ChildNumber, CoinType, DerivationPath, Error, ExtendedKey, ExtendedPrivKey,
    ExtendedPubKey, Network,
};
use secp256k1::Secp256k1;
use std::str::FromStr;

fn assert_chain(
    master: &ExtendedPrivKey,
    path: &str,
    expected_xprv: &str,
    expected_xpub: &str,
) {
    let secp = Secp256k1::new();
    let path = DerivationPath::from_str(path).unwrap();
    let derived = master.derive_priv(&secp, &path).unwrap();
    assert_eq!(
        derived.to_base58(CoinType::Bitcoin, Network::Mainnet),
        expected_xprv,
        "xprv mismatch at {}",
        path
    );
    let pubkey = ExtendedPubKey::from_priv(&secp, &derived);
    assert_eq!(
        pubkey.to_base58(CoinType::Bitcoin, Network::Mainnet),
        expected_xpub,
        "xpub mismatch at {}",
        path
    );
}

// BIP32 test vector 1
#[test]
fn test_vector_1() {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let master = ExtendedPrivKey::new_master(&seed).unwrap();

    assert_eq!(master.depth, 0);
    assert_eq!(master.parent_fingerprint, 0);
    assert_eq!(master.child_number, ChildNumber::Normal { index: 0 });

    assert_chain(
        &master,
        "m",
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi",
        "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8",
    );
    assert_chain(
        &master,
        "m/0'",
        "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7",
        "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw",
    );
    assert_chain(
        &master,
        "m/0'/1",
        "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs",
        "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ",
    );
    assert_chain(
        &master,
        "m/0'/1/2'",
        "xprv9z4pot5VBttmtdRTWfWQmoH1taj2axGVzFqSb8C9xaxKymcFzXBDptWmT7FwuEzG3ryjH4ktypQSAewRiNMjANTtpgP4mLTj34bhnZX7UiM",
        "xpub6D4BDPcP2GT577Vvch3R8wDkScZWzQzMMUm3PWbmWvVJrZwQY4VUNgqFJPMM3No2dFDFGTsxxpG5uJh7n7epu4trkrX7x7DogT5Uv6fcLW5",
    );
    assert_chain(
        &master,
        "m/0'/1/2'/2",
        "xprvA2JDeKCSNNZky6uBCviVfJSKyQ1mDYahRjijr5idH2WwLsEd4Hsb2Tyh8RfQMuPh7f7RtyzTtdrbdqqsunu5Mm3wDvUAKRHSC34sJ7in334",
        "xpub6FHa3pjLCk84BayeJxFW2SP4XRrFd1JYnxeLeU8EqN3vDfZmbqBqaGJAyiLjTAwm6ZLRQUMv1ZACTj37sR62cfN7fe5JnJ7dh8zL4fiyLHV",
    );
    assert_chain(
        &master,
        "m/0'/1/2'/2/1000000000",
        "xprvA41z7zogVVwxVSgdKUHDy1SKmdb533PjDz7J6N6mV6uS3ze1ai8FHa8kmHScGpWmj4WggLyQjgPie1rFSruoUihUZREPSL39UNdE3BBDu76",
        "xpub6H1LXWLaKsWFhvm6RVpEL9P4KfRZSW7abD2ttkWP3SSQvnyA8FSVqNTEcYFgJS2UaFcxupHiYkro49S8yGasTvXEYBVPamhGW6cFJodrTHy",
    );
}

// BIP32 test vector 2
#[test]
fn test_vector_2() {
    let seed = hex::decode(
        "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a2\
         9f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542",
    )
    .unwrap();
    let master = ExtendedPrivKey::new_master(&seed).unwrap();

    assert_chain(
        &master,
        "m",
        "xprv9s21ZrQH143K31xYSDQpPDxsXRTUcvj2iNHm5NUtrGiGG5e2DtALGdso3pGz6ssrdK4PFmM8NSpSBHNqPqm55Qn3LqFtT2emdEXVYsCzC2U",
        "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
    );
    assert_chain(
        &master,
        "m/0",
        "xprv9vHkqa6EV4sPZHYqZznhT2NPtPCjKuDKGY38FBWLvgaDx45zo9WQRUT3dKYnjwih2yJD9mkrocEZXo1ex8G81dwSM1fwqWpWkeS3v86pgKt",
        "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH",
    );
    assert_chain(
        &master,
        "m/0/2147483647'",
        "xprv9wSp6B7kry3Vj9m1zSnLvN3xH8RdsPP1Mh7fAaR7aRLcQMKTR2vidYEeEg2mUCTAwCd6vnxVrcjfy2kRgVsFawNzmjuHc2YmYRmagcEPdU9",
        "xpub6ASAVgeehLbnwdqV6UKMHVzgqAG8Gr6riv3Fxxpj8ksbH9ebxaEyBLZ85ySDhKiLDBrQSARLq1uNRts8RuJiHjaDMBU4Zn9h8LZNnBC5y4a",
    );
    assert_chain(
        &master,
        "m/0/2147483647'/1",
        "xprv9zFnWC6h2cLgpmSA46vutJzBcfJ8yaJGg8cX1e5StJh45BBciYTRXSd25UEPVuesF9yog62tGAQtHjXajPPdbRCHuWS6T8XA2ECKADdw4Ef",
        "xpub6DF8uhdarytz3FWdA8TvFSvvAh8dP3283MY7p2V4SeE2wyWmG5mg5EwVvmdMVCQcoNJxGoWaU9DCWh89LojfZ537wTfunKau47EL2dhHKon",
    );
    assert_chain(
        &master,
        "m/0/2147483647'/1/2147483646'",
        "xprvA1RpRA33e1JQ7ifknakTFpgNXPmW2YvmhqLQYMmrj4xJXXWYpDPS3xz7iAxn8L39njGVyuoseXzU6rcxFLJ8HFsTjSyQbLYnMpCqE2VbFWc",
        "xpub6ERApfZwUNrhLCkDtcHTcxd75RbzS1ed54G1LkBUHQVHQKqhMkhgbmJbZRkrgZw4koxb5JaHWkY4ALHY2grBGRjaDMzQLcgJvLJuZZvRcEL",
    );
    assert_chain(
        &master,
        "m/0/2147483647'/1/2147483646'/2",
        "xprvA2nrNbFZABcdryreWet9Ea4LvTJcGsqrMzxHx98MMrotbir7yrKCEXw7nadnHM8Dq38EGfSh6dqA9QWTyefMLEcBYJUuekgW4BYPJcr9E7j",
        "xpub6FnCn6nSzZAw5Tw7cgR9bi15UV96gLZhjDstkXXxvCLsUXBGXPdSnLFbdpq8p9HmGsApME5hQTZ3emM2rnY5agb9rXpVGyy3bdW6EEgAtqt",
    );
}

// BIP32 test vector 3: leading zeros in the master scalar must survive
#[test]
fn test_vector_3() {
    let seed = hex::decode(
        "4b381541583be4423346c643850da4b320e46a87ae3d2a4e6da11eba819cd4ac\
         ba45d239319ac14f863b8d5ab5a0d0c64d2e8a1e7d1457df2e5a3c51c73235be",
    )
    .unwrap();
    let master = ExtendedPrivKey::new_master(&seed).unwrap();

    assert_chain(
        &master,
        "m",
        "xprv9s21ZrQH143K25QhxbucbDDuQ4naNntJRi4KUfWT7xo4EKsHt2QJDu7KXp1A3u7Bi1j8ph3EGsZ9Xvz9dGuVrtHHs7pXeTzjuxBrCmmhgC6",
        "xpub661MyMwAqRbcEZVB4dScxMAdx6d4nFc9nvyvH3v4gJL378CSRZiYmhRoP7mBy6gSPSCYk6SzXPTf3ND1cZAceL7SfJ1Z3GC8vBgp2epUt13",
    );
    assert_chain(
        &master,
        "m/0'",
        "xprv9uPDJpEQgRQfDcW7BkF7eTya6RPxXeJCqCJGHuCJ4GiRVLzkTXBAJMu2qaMWPrS7AANYqdq6vcBcBUdJCVVFceUvJFjaPdGZ2y9WACViL4L",
        "xpub68NZiKmJWnxxS6aaHmn81bvJeTESw724CRDs6HbuccFQN9Ku14VQrADWgqbhhTHBaohPX4CjNLf9fq9MYo6oDaPPLPxSb7gwQN3ih19Zm4Y",
    );
}

#[test]
fn test_master_version_bytes() {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let master = ExtendedPrivKey::new_master(&seed).unwrap();
    let serialized = master.to_base58(CoinType::Bitcoin, Network::Mainnet);
    let raw = base58::decode(&serialized).unwrap();
    assert_eq!(raw.len(), 82);
    assert_eq!(&raw[..4], &[0x04, 0x88, 0xad, 0xe4]);
}

#[test]
fn test_child_metadata() {
    let secp = Secp256k1::new();
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let master = ExtendedPrivKey::new_master(&seed).unwrap();

    let child = master
        .ckd_priv(&secp, ChildNumber::from_hardened_idx(0).unwrap())
        .unwrap();
    assert_eq!(child.depth, 1);
    assert_eq!(child.parent_fingerprint, master.fingerprint(&secp));
    assert_eq!(child.child_number, ChildNumber::Hardened { index: 0 });
}

#[test]
fn test_derivation_is_deterministic() {
    let secp = Secp256k1::new();
    let master = ExtendedPrivKey::new_master(&[0x5au8; 64]).unwrap();
    let path = DerivationPath::from_str("m/7'/1/9").unwrap();
    let a = master.derive_priv(&secp, &path).unwrap();
    let b = master.derive_priv(&secp, &path).unwrap();
    assert_eq!(
        a.to_base58(CoinType::Bitcoin, Network::Mainnet),
        b.to_base58(CoinType::Bitcoin, Network::Mainnet)
    );
}

#[test]
fn test_public_derivation_matches_private() {
    let secp = Secp256k1::new();
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let master = ExtendedPrivKey::new_master(&seed).unwrap();
    let master_pub = ExtendedPubKey::from_priv(&secp, &master);

    let child_number = ChildNumber::from_normal_idx(5).unwrap();
    let child_pub = master_pub.ckd_pub(&secp, child_number).unwrap();
    let child_priv = master.ckd_priv(&secp, child_number).unwrap();

    assert_eq!(child_pub, ExtendedPubKey::from_priv(&secp, &child_priv));
}

#[test]
fn test_hardened_derivation_from_public_key_fails() {
    let secp = Secp256k1::new();
    let master = ExtendedPrivKey::new_master(&[0x11u8; 32]).unwrap();
    let master_pub = ExtendedPubKey::from_priv(&secp, &master);
    assert_eq!(
        master_pub.ckd_pub(&secp, ChildNumber::Hardened { index: 0 }),
        Err(Error::HardenedDerivationOnPublicKey)
    );
}

#[test]
fn test_serialization_round_trip_all_networks() {
    let secp = Secp256k1::new();
    let master = ExtendedPrivKey::new_master(&[0x42u8; 16]).unwrap();
    let path = DerivationPath::from_str("m/44'/2'/0'").unwrap();
    let key = master.derive_priv(&secp, &path).unwrap();
    let pubkey = ExtendedPubKey::from_priv(&secp, &key);

    for coin in [CoinType::Bitcoin, CoinType::Litecoin] {
        for network in [Network::Mainnet, Network::Testnet] {
            let xprv = key.to_base58(coin, network);
            let (decoded, dec_coin, dec_net) = ExtendedPrivKey::from_base58(&xprv).unwrap();
            assert_eq!(decoded, key);
            assert_eq!((dec_coin, dec_net), (coin, network));

            let xpub = pubkey.to_base58(coin, network);
            let (decoded, dec_coin, dec_net) = ExtendedPubKey::from_base58(&xpub).unwrap();
            assert_eq!(decoded, pubkey);
            assert_eq!((dec_coin, dec_net), (coin, network));
        }
    }
}

#[test]
fn test_network_prefixes_render_as_expected() {
    let secp = Secp256k1::new();
    let master = ExtendedPrivKey::new_master(&[0x42u8; 16]).unwrap();
    let master_pub = ExtendedPubKey::from_priv(&secp, &master);

    assert!(master.to_base58(CoinType::Bitcoin, Network::Mainnet).starts_with("xprv"));
    assert!(master_pub.to_base58(CoinType::Bitcoin, Network::Mainnet).starts_with("xpub"));
    assert!(master.to_base58(CoinType::Bitcoin, Network::Testnet).starts_with("tprv"));
    assert!(master_pub.to_base58(CoinType::Bitcoin, Network::Testnet).starts_with("tpub"));
    assert!(master.to_base58(CoinType::Litecoin, Network::Mainnet).starts_with("Ltpv"));
    assert!(master_pub.to_base58(CoinType::Litecoin, Network::Mainnet).starts_with("Ltub"));
}

#[test]
fn test_extended_key_dispatch() {
    let secp = Secp256k1::new();
    let master = ExtendedPrivKey::new_master(&[0x42u8; 16]).unwrap();
    let xprv = master.to_base58(CoinType::Bitcoin, Network::Mainnet);
    let xpub = ExtendedPubKey::from_priv(&secp, &master).to_base58(CoinType::Bitcoin, Network::Mainnet);

    let (key, coin, network) = ExtendedKey::from_base58(&xprv).unwrap();
    assert!(key.is_private());
    assert_eq!((coin, network), (CoinType::Bitcoin, Network::Mainnet));

    let (key, _, _) = ExtendedKey::from_base58(&xpub).unwrap();
    assert!(!key.is_private());

    // kind mismatch both directions
    assert!(ExtendedPrivKey::from_base58(&xpub).is_err());
    assert!(ExtendedPubKey::from_base58(&xprv).is_err());
}

#[test]
fn test_decode_errors() {
    // unknown version prefix (from the BIP32 error vectors)
    assert_eq!(
        ExtendedKey::from_base58(
            "DMwo58pR1QLEFihHiXPVykYB6fJmsTeHvyTp7hRThAtCX8CvYzgPcn8XnmdfHGMQzT7ayAmfo4z3gY5KfbrZWZ6St24UVf2Qgo6oujFktLHdHY4"
        ),
        Err(Error::UnknownVersion)
    );

    // corrupted checksum
    let master = ExtendedPrivKey::new_master(&[0x42u8; 16]).unwrap();
    let mut xprv = master.to_base58(CoinType::Bitcoin, Network::Mainnet);
    let last = if xprv.ends_with('2') { '3' } else { '2' };
    xprv.pop();
    xprv.push(last);
    assert_eq!(ExtendedPrivKey::from_base58(&xprv), Err(Error::Checksum));

    // wrong payload length
    assert!(matches!(
        ExtendedPrivKey::from_base58(&base58::check_encode(&[0u8; 40])),
        Err(Error::Format(_))
    ));
}
