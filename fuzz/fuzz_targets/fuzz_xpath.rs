//! Fuzz target for the XPath subset.
//!
//! Goal: parsing an expression and evaluating it against a Mule configuration should
//! **never panic**. Unsupported syntax must surface as an `XPathError`.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_xpath
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use muleguard_domain::xml::{self, XPath};

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mule xmlns="http://www.mulesoft.org/schema/mule/core"
      xmlns:http="http://www.mulesoft.org/schema/mule/http">
  <http:listener-config name="listener">
    <http:listener-connection host="0.0.0.0" port="8081"/>
  </http:listener-config>
  <flow name="main">
    <http:listener config-ref="listener" path="/api/*"/>
    <logger level="INFO" message="#[payload]"/>
    <set-payload value="done"/>
  </flow>
</mule>
"#;

fuzz_target!(|data: &[u8]| {
    let Ok(expr) = std::str::from_utf8(data) else {
        return;
    };
    if expr.len() > 512 {
        return;
    }

    let Ok(xpath) = XPath::parse(expr) else {
        return;
    };
    if let Ok(doc) = xml::parse(DOCUMENT) {
        let _ = xpath.matches(&doc);
    }
});
