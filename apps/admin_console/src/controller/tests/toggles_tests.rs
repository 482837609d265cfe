use super::*;

use std::collections::BTreeSet;

use url::Url;

use crate::page::region::RegionId;

const FORM: &str = r#"<form id="konnektorForm">
<input type="checkbox" id="activated" name="activated"/>
<input type="text" id="ip" name="ip"/>
<input type="text" id="name" name="name"/>
<input type="number" id="timeout" name="timeout"/>
<select id="konnektorAuthMethod" name="konnektorAuthMethod">
<option value="NONE">keine</option>
<option value="CERT">Zertifikat</option>
<option value="BASICAUTH">Basic</option>
</select>
<input type="password" id="certAuthPwd"/>
<input type="password" id="certAuthPwdCheck"/>
<input type="file" id="certFilename"/>
<input type="text" id="basicAuthUser"/>
<input type="password" id="basicAuthPwd"/>
<input type="password" id="basicAuthPwdCheck"/>
<input type="text" id="comment" name="comment"/>
</form>"#;

fn page() -> Page {
    let mut page = Page::with_base(Url::parse("http://console.local/").expect("url"));
    page.append_fragment(&RegionId::Config, FORM).expect("form");
    page
}

fn disabled(page: &Page) -> BTreeSet<String> {
    page.controls()
        .iter()
        .filter(|control| control.disabled)
        .filter_map(|control| control.id.clone())
        .collect()
}

#[test]
fn checkbox_disables_exactly_its_fields_and_back() {
    let mut page = page();

    toggle_on_checked(&mut page, KONNEKTOR_ACTIVATED, &KONNEKTOR_FIELDS);
    let expected: BTreeSet<String> = KONNEKTOR_FIELDS.iter().map(|f| f.to_string()).collect();
    assert_eq!(disabled(&page), expected);

    page.set_checked(KONNEKTOR_ACTIVATED, true).expect("check");
    toggle_on_checked(&mut page, KONNEKTOR_ACTIVATED, &KONNEKTOR_FIELDS);
    assert!(disabled(&page).is_empty());

    page.set_checked(KONNEKTOR_ACTIVATED, false).expect("uncheck");
    toggle_on_checked(&mut page, KONNEKTOR_ACTIVATED, &KONNEKTOR_FIELDS);
    assert_eq!(disabled(&page), expected);
    assert!(!page.is_disabled("comment"));
}

#[test]
fn select_enables_fields_only_for_matching_value() {
    let mut page = page();
    assert_eq!(page.control_value(KONNEKTOR_AUTH_METHOD), Some("NONE"));

    toggle_on_selected(&mut page, KONNEKTOR_AUTH_METHOD, "CERT", &CERT_AUTH_FIELDS);
    assert!(CERT_AUTH_FIELDS.iter().all(|field| page.is_disabled(field)));

    page.set_value(KONNEKTOR_AUTH_METHOD, "CERT").expect("select");
    toggle_on_selected(&mut page, KONNEKTOR_AUTH_METHOD, "CERT", &CERT_AUTH_FIELDS);
    assert!(CERT_AUTH_FIELDS.iter().all(|field| !page.is_disabled(field)));
}

#[test]
fn konnektor_rules_follow_activation_then_auth_method() {
    let mut page = page();
    page.set_checked(KONNEKTOR_ACTIVATED, true).expect("check");
    page.set_value(KONNEKTOR_AUTH_METHOD, "BASICAUTH").expect("select");

    apply_konnektor_rules(&mut page);

    let expected: BTreeSet<String> = CERT_AUTH_FIELDS.iter().map(|f| f.to_string()).collect();
    assert_eq!(disabled(&page), expected);
    assert!(BASIC_AUTH_FIELDS.iter().all(|field| !page.is_disabled(field)));
}

#[test]
fn missing_fields_are_skipped() {
    let mut page = Page::with_base(Url::parse("http://console.local/").expect("url"));

    apply_konnektor_rules(&mut page);

    assert!(page.controls().is_empty());
}
