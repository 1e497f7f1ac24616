use chrono::{NaiveDate, Utc};
use hairstyle_api::domain::{
    shared::pagination::{CursorRequest, MAX_PAGE_SIZE, PageRequest},
    user::{
        entity::{UserInfo, fallback_nickname},
        value_objects::{INVITE_CODE_ALPHABET, InviteCode, Nickname},
    },
};

fn user() -> UserInfo {
    UserInfo {
        id: 7,
        user_id: "oWx_1234567890".to_string(),
        nickname: None,
        avatar_url: None,
        coin: 60,
        invite_code: Some("K3Y9Q2".to_string()),
        used_invite_code: Some(String::new()),
        last_sign_in_date: NaiveDate::from_ymd_opt(2026, 10, 15),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn invite_code_accepts_expected_format() {
    assert_eq!(InviteCode::new("a1b2c3").unwrap().as_str(), "A1B2C3");
    assert!(InviteCode::new(" ZZZZZZ ").is_ok());
}

#[test]
fn invite_code_rejects_wrong_length_or_symbols() {
    assert!(InviteCode::new("ABC12").is_err());
    assert!(InviteCode::new("ABC1234").is_err());
    assert!(InviteCode::new("AB_123").is_err());
    assert!(InviteCode::new("").is_err());
}

#[test]
fn generated_invite_codes_use_the_alphabet() {
    for _ in 0..50 {
        let code = InviteCode::generate();
        assert_eq!(code.as_str().len(), 6);
        assert!(code.as_str().bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)));
        assert!(InviteCode::new(code.as_str()).is_ok());
    }
}

#[test]
fn nickname_enforces_length_bounds() {
    assert!(Nickname::new("Mia").is_ok());
    assert!(Nickname::new("   ").is_err());
    assert!(Nickname::new(&"n".repeat(33)).is_err());
}

#[test]
fn sign_in_and_invite_state_helpers() {
    let u = user();
    assert!(u.has_signed_in_on(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()));
    assert!(!u.has_signed_in_on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()));
    // An empty string counts as never having used a code.
    assert!(!u.has_used_invite_code());
    assert_eq!(u.display_name(), "User567890");
    assert_eq!(fallback_nickname("o1"), "Usero1");
}

#[test]
fn page_request_is_clamped() {
    let p = PageRequest::default();
    assert_eq!((p.page, p.page_size), (1, 10));
    let p = PageRequest::new(0, 500);
    assert_eq!((p.page, p.page_size), (1, MAX_PAGE_SIZE));
    assert_eq!(PageRequest::new(3, 10).offset(), 20);
}

#[test]
fn cursor_zero_means_newest() {
    assert_eq!(CursorRequest::new(0, 10).upper_bound(), i64::MAX);
    assert_eq!(CursorRequest::new(42, 10).upper_bound(), 42);
    assert_eq!(CursorRequest::new(-5, 0).page_size, 1);
}

#[test]
fn next_cursor_stops_on_short_page() {
    let c = CursorRequest::new(0, 3);
    assert_eq!(c.next_cursor(3, Some(17)), 17);
    assert_eq!(c.next_cursor(2, Some(17)), 0);
    assert_eq!(c.next_cursor(0, None), 0);
}
