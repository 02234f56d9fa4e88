//! Built-in preload records.
//!
//! Generated data: regenerate from the preload source list, do not edit by
//! hand. Labels are canonical; pins are SHA-1 SPKI digests.

use std::borrow::Cow;

use stsguard_core::Digest;

use super::PreloadRecord;

const SPKI_PIN_TEST_PRIMARY: Digest = Digest::Sha1([
    0x1a, 0xec, 0xde, 0x93, 0xd9, 0x4c, 0xc1, 0x1d, 0xca, 0x78,
    0x84, 0xbc, 0xc3, 0x04, 0xbd, 0x80, 0x1b, 0xd5, 0xb4, 0x88,
]);

const SPKI_PIN_TEST_BACKUP: Digest = Digest::Sha1([
    0xb7, 0x04, 0x48, 0x1d, 0xe3, 0x78, 0xf5, 0xba, 0x8d, 0xdb,
    0x02, 0x6f, 0x35, 0x78, 0x04, 0x59, 0xba, 0x67, 0x03, 0xd3,
]);

const SPKI_PIN_TEST_REVOKED: Digest = Digest::Sha1([
    0x84, 0x16, 0x77, 0x89, 0xe5, 0x07, 0x5f, 0xdb, 0x56, 0x99,
    0xe0, 0xb5, 0x4e, 0x3a, 0x62, 0xa1, 0xf8, 0x8f, 0x23, 0x49,
]);

static PIN_TEST_ALLOWED: [Digest; 2] = [SPKI_PIN_TEST_PRIMARY, SPKI_PIN_TEST_BACKUP];
static PIN_TEST_BLOCKED: [Digest; 1] = [SPKI_PIN_TEST_REVOKED];

pub(super) static RECORDS: &[PreloadRecord] = &[
    PreloadRecord::upgrade("www.paypal.com", false),
    PreloadRecord::upgrade("paypal.com", false),
    PreloadRecord::upgrade("www.elanex.biz", false),
    PreloadRecord::upgrade("jottit.com", true),
    PreloadRecord::upgrade("sunshinepress.org", true),
    PreloadRecord::upgrade("www.noisebridge.net", false),
    PreloadRecord::upgrade("neg9.org", false),
    PreloadRecord::upgrade("riseup.net", true),
    PreloadRecord::upgrade("factor.cc", false),
    PreloadRecord::upgrade("crypto.cat", true),
    PreloadRecord::upgrade("lastpass.com", false),
    PreloadRecord::upgrade("www.lastpass.com", false),
    PreloadRecord::upgrade("keyerror.com", true),
    PreloadRecord::upgrade("entropia.de", false),
    PreloadRecord::upgrade("www.entropia.de", false),
    PreloadRecord::upgrade("romab.com", true),
    PreloadRecord::upgrade("logentries.com", false),
    PreloadRecord::upgrade("www.logentries.com", false),
    PreloadRecord::upgrade("alpha.irccloud.com", false),
    PreloadRecord::upgrade("passwd.io", true),
    PreloadRecord::upgrade("developer.mydigipass.com", false),
    PreloadRecord::upgrade("www.developer.mydigipass.com", false),
    PreloadRecord::upgrade("sandbox.mydigipass.com", false),
    PreloadRecord::upgrade("www.sandbox.mydigipass.com", false),
    PreloadRecord::upgrade("crate.io", true),
    PreloadRecord::upgrade("twitter.com", false),
    PreloadRecord::upgrade("www.twitter.com", false),
    PreloadRecord::upgrade("mobile.twitter.com", true),
    PreloadRecord::upgrade("dropbox.com", false),
    PreloadRecord::upgrade("www.dropbox.com", true),
    PreloadRecord {
        label: Cow::Borrowed("pinning-test.stsguard.test"),
        include_subdomains: true,
        upgrade: false,
        allowed_spki: Cow::Borrowed(&PIN_TEST_ALLOWED),
        blocked_spki: Cow::Borrowed(&PIN_TEST_BLOCKED),
        trust_agility_key: None,
    },
    PreloadRecord {
        label: Cow::Borrowed("tack-test.stsguard.test"),
        include_subdomains: false,
        upgrade: true,
        allowed_spki: Cow::Borrowed(&[]),
        blocked_spki: Cow::Borrowed(&[]),
        trust_agility_key: Some(Cow::Borrowed("t4jgf.vm7ol.g6xkx.e5p3e.ea4nj")),
    },
];
