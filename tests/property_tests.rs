//! Property-based tests using proptest
//!
//! Checksum and encoding invariants over randomly generated buffers and
//! field values.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use submission_protocol::core::checksum;
use submission_protocol::core::packet::PREFIX_LEN;
use submission_protocol::protocol::message::{
    Exchange, LoginRequest, Request, Response, SubmissionRequest, SubmissionResponse,
};

// Property: a stamped buffer always verifies
proptest! {
    #[test]
    fn prop_stamp_then_verify(mut buf in prop::collection::vec(any::<u8>(), PREFIX_LEN..512)) {
        checksum::stamp(&mut buf).expect("buffer holds a checksum field");
        prop_assert!(checksum::verify(&mut buf));
    }
}

// Property: verification leaves the buffer exactly as it found it
proptest! {
    #[test]
    fn prop_verify_is_non_destructive(buf in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut copy = buf.clone();
        let _ = checksum::verify(&mut copy);
        prop_assert_eq!(copy, buf);
    }
}

// Property: flipping any single bit of a stamped message is detected
proptest! {
    #[test]
    fn prop_single_bit_flip_detected(
        mut buf in prop::collection::vec(any::<u8>(), PREFIX_LEN..256),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        checksum::stamp(&mut buf).expect("buffer holds a checksum field");
        let i = index.index(buf.len());
        buf[i] ^= 1 << bit;
        prop_assert!(!checksum::verify(&mut buf));
    }
}

// Property: requests decode to what was encoded, text truncated to capacity - 1
proptest! {
    #[test]
    fn prop_login_fields_survive_encoding(
        user in "[a-zA-Z0-9@._-]{0,100}",
        password in "[a-zA-Z0-9!#%]{0,40}",
        timestamp in any::<u64>(),
    ) {
        let request = Request::Login(LoginRequest::new(user.clone(), password.clone()));
        let mut bytes = request.to_bytes(timestamp).to_vec();
        prop_assert_eq!(bytes.len(), 109);

        let (header, decoded) = Request::from_bytes(&mut bytes).expect("valid request");
        prop_assert_eq!(header.timestamp, timestamp);
        match decoded {
            Request::Login(login) => {
                prop_assert_eq!(login.user, user.chars().take(63).collect::<String>());
                prop_assert_eq!(login.password, password.chars().take(31).collect::<String>());
            }
            other => prop_assert!(false, "expected login, got {:?}", other),
        }
    }
}

proptest! {
    #[test]
    fn prop_submission_fields_survive_encoding(
        name in "[a-zA-Z ]{0,80}",
        email in "[a-z0-9@.]{0,80}",
        repo in "https://[a-z/.]{0,80}",
    ) {
        let request = Request::Submission(SubmissionRequest::new(name.clone(), email.clone(), repo.clone()));
        let mut bytes = request.to_bytes(1).to_vec();
        prop_assert_eq!(bytes.len(), 205);

        match Request::from_bytes(&mut bytes).expect("valid request").1 {
            Request::Submission(sub) => {
                prop_assert_eq!(sub.name, name.chars().take(63).collect::<String>());
                prop_assert_eq!(sub.email, email.chars().take(63).collect::<String>());
                prop_assert_eq!(sub.repo, repo.chars().take(63).collect::<String>());
            }
            other => prop_assert!(false, "expected submission, got {:?}", other),
        }
    }
}

// Property: decoding arbitrary bytes never panics
proptest! {
    #[test]
    fn prop_decode_arbitrary_bytes(buf in prop::collection::vec(any::<u8>(), 0..256)) {
        for exchange in [Exchange::Login, Exchange::Submission, Exchange::Logout] {
            let mut copy = buf.clone();
            let _ = Response::decode(&mut copy, exchange);
        }
        let mut copy = buf.clone();
        let _ = Request::from_bytes(&mut copy);
    }
}

// Property: a response of the wrong size is never accepted
proptest! {
    #[test]
    fn prop_wrong_length_rejected(token in "[A-Z0-9-]{1,31}", cut in 1usize..45) {
        let mut bytes = Response::Submission(SubmissionResponse::new(token, 0)).to_bytes().to_vec();
        bytes.truncate(45 - cut);
        prop_assert!(Response::decode(&mut bytes, Exchange::Submission).is_err());
    }
}
