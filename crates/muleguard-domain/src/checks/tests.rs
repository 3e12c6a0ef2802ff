use crate::test_support::{
    MULE_FLOW, POM_WITH_DEPENDENCIES, TempProject, run_check, run_check_with_envs,
};
use serde_json::json;

fn mule_project() -> TempProject {
    let project = TempProject::new();
    project
        .write("pom.xml", POM_WITH_DEPENDENCIES)
        .write("src/main/mule/orders.xml", MULE_FLOW);
    project
}

// ----------------------------------------------------------------------------
// Token search
// ----------------------------------------------------------------------------

#[test]
fn forbidden_token_names_file_and_token() {
    let project = mule_project();
    let outcome = run_check(
        &project,
        "GENERIC_TOKEN_SEARCH",
        json!({ "filePatterns": ["src/main/mule/**/*.xml"], "tokens": ["logger", "flow-ref"] }),
    );

    assert!(!outcome.passed);
    assert_eq!(
        outcome.message,
        "Forbidden tokens found:\n• Forbidden token 'logger' found in file: src/main/mule/orders.xml"
    );
}

#[test]
fn required_tokens_honour_require_all() {
    let project = mule_project();
    let params = |require_all: bool| {
        json!({
            "filePatterns": ["**/*.xml"],
            "tokens": ["http:listener", "apikit:router"],
            "requireAll": require_all
        })
    };

    let all = run_check(&project, "GENERIC_TOKEN_SEARCH_REQUIRED", params(true));
    assert!(!all.passed);
    assert!(all.message.contains("Required token 'apikit:router' not found"));
    assert!(!all.message.contains("'http:listener' not found"));

    let any = run_check(&project, "GENERIC_TOKEN_SEARCH_REQUIRED", params(false));
    assert!(any.passed, "{}", any.message);
}

#[test]
fn no_matching_files_pass_forbidden_and_fail_required() {
    let project = mule_project();
    let params = json!({ "filePatterns": ["src/**/*.dwl"], "tokens": ["error.muleMessage"] });

    let forbidden = run_check(&project, "GENERIC_TOKEN_SEARCH_FORBIDDEN", params.clone());
    assert!(forbidden.passed);
    let required = run_check(&project, "GENERIC_TOKEN_SEARCH_REQUIRED", params);
    assert!(!required.passed);
    assert_eq!(required.message, "No files found matching patterns: src/**/*.dwl");
}

#[test]
fn invalid_regex_falls_back_to_substring() {
    let project = TempProject::new();
    project.write("src/main/resources/transform.dwl", "output = lookup(\"x\"");

    let outcome = run_check(
        &project,
        "GENERIC_TOKEN_SEARCH",
        json!({ "filePatterns": ["**/*.dwl"], "tokens": ["lookup("], "matchMode": "REGEX" }),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.contains("'lookup('"));
}

#[test]
fn regex_mode_honours_case_flag() {
    let project = TempProject::new();
    project.write("src/main/mule/a.xml", "<set-variable value=\"#[Error.Cause]\"/>");
    let params = |case_sensitive: bool| {
        json!({
            "filePatterns": ["**/*.xml"],
            "tokens": ["error\\.cause"],
            "matchMode": "REGEX",
            "caseSensitive": case_sensitive
        })
    };

    assert!(run_check(&project, "GENERIC_TOKEN_SEARCH", params(true)).passed);
    assert!(!run_check(&project, "GENERIC_TOKEN_SEARCH", params(false)).passed);
}

#[test]
fn token_in_element_is_scoped_to_the_opening_tag() {
    let project = mule_project();
    let params = |element: &str| {
        json!({
            "filePatterns": ["src/main/mule/*.xml"],
            "tokens": ["cipherSuite"],
            "elementName": element
        })
    };

    let in_config = run_check(&project, "FORBIDDEN_TOKEN_IN_ELEMENT", params("config"));
    assert!(!in_config.passed);
    let in_flow = run_check(&project, "FORBIDDEN_TOKEN_IN_ELEMENT", params("flow"));
    assert!(in_flow.passed, "{}", in_flow.message);
}

// ----------------------------------------------------------------------------
// XML
// ----------------------------------------------------------------------------

#[test]
fn xpath_exists_resolves_document_prefixes() {
    let project = mule_project();
    let outcome = run_check(
        &project,
        "XML_XPATH_EXISTS",
        json!({ "xpaths": ["//http:listener-config", "//flow[@name='orders-main']"] }),
    );
    assert!(outcome.passed, "{}", outcome.message);

    let missing = run_check(
        &project,
        "XML_XPATH_EXISTS",
        json!({
            "xpath": "//apikit:config",
            "failureMessage": "APIkit router is not configured:"
        }),
    );
    assert!(!missing.passed);
    assert!(missing.message.starts_with("APIkit router is not configured:\n• "));
}

#[test]
fn xpath_not_exists_reports_each_match() {
    let project = mule_project();
    let clean = run_check(
        &project,
        "XML_XPATH_NOT_EXISTS",
        json!({ "xpath": "//logger[@level='DEBUG']" }),
    );
    assert!(clean.passed);

    let dirty = run_check(
        &project,
        "XML_XPATH_NOT_EXISTS",
        json!({ "xpath": "//logger[@level='INFO']" }),
    );
    assert!(!dirty.passed);
    assert!(dirty.message.contains(
        "Forbidden XPath '//logger[@level='INFO']' matched in src/main/mule/orders.xml"
    ));
}

#[test]
fn attribute_value_resolves_placeholders() {
    let project = mule_project();
    let params = json!({
        "xpath": "//ibm-mq:config/@cipherSuite",
        "expectedValue": "TLS_RSA_WITH_AES_128_GCM_SHA256",
        "propertyResolution": true
    });

    let unresolved = run_check(&project, "IBM_MQ_CIPHER_CHECK", params.clone());
    assert!(!unresolved.passed);
    assert!(unresolved.message.contains(
        "Property not found in src/main/mule/orders.xml. Placeholder: \"${mq.cipher}\""
    ));

    project.write(
        "src/main/resources/config.properties",
        "mq.cipher=TLS_RSA_WITH_AES_128_GCM_SHA256\n",
    );
    let resolved = run_check(&project, "IBM_MQ_CIPHER_CHECK", params);
    assert!(resolved.passed, "{}", resolved.message);
}

#[test]
fn attribute_value_without_selected_nodes_is_not_applicable() {
    let project = mule_project();
    let outcome = run_check(
        &project,
        "IBM_MQ_CIPHER_CHECK",
        json!({ "xpath": "//jms:config/@cipher", "expectedValue": "x" }),
    );
    assert!(outcome.passed);
    assert!(outcome.message.contains("not applicable"));
}

#[test]
fn attribute_exists_checks_every_named_element() {
    let project = mule_project();
    let present = run_check(
        &project,
        "XML_ATTRIBUTE_EXISTS",
        json!({ "elementName": "http:listener-connection", "requiredAttribute": "host" }),
    );
    assert!(present.passed, "{}", present.message);

    let missing = run_check(
        &project,
        "XML_ATTRIBUTE_EXISTS",
        json!({ "elementName": "listener-connection", "requiredAttribute": "protocol" }),
    );
    assert!(!missing.passed);
    assert!(missing.message.contains("missing attribute 'protocol'"));
}

#[test]
fn forbidden_attribute_lists_offenders_per_file() {
    let project = mule_project();
    let outcome = run_check(
        &project,
        "UNSUPPORTED_XML_ATTRIBUTE",
        json!({ "elements": ["logger", "flow"], "attributes": ["level", "processingStrategy"] }),
    );
    assert!(!outcome.passed);
    assert_eq!(
        outcome.message,
        "Forbidden attributes found:\n• src/main/mule/orders.xml: 'level' in <logger>"
    );
}

#[test]
fn forbidden_element_value_is_case_insensitive_by_default() {
    let project = TempProject::new();
    project.write(
        "src/main/mule/crypto.xml",
        "<mule><crypto:jce-encrypt-pbe algorithm=\"PBEWithMD5AndDES\"/></mule>",
    );
    let outcome = run_check(
        &project,
        "CRYPTO_JCE_ENCRYPT_PBE_CHECK",
        json!({ "elementName": "jce-encrypt-pbe", "forbiddenValue": "pbewithmd5anddes" }),
    );
    assert!(!outcome.passed);
}

#[test]
fn xml_parse_errors_are_reported_and_other_files_continue() {
    let project = mule_project();
    project.write("src/main/mule/broken.xml", "<mule><flow></mule>");
    let outcome = run_check(
        &project,
        "XML_XPATH_NOT_EXISTS",
        json!({ "xpath": "//logger[@level='INFO']" }),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.contains("Error parsing XML file src/main/mule/broken.xml"));
    assert!(outcome.message.contains("matched in src/main/mule/orders.xml"));
}

#[test]
fn xml_no_files_policy() {
    let project = TempProject::new();
    let exists = run_check(&project, "XML_XPATH_EXISTS", json!({ "xpath": "//flow" }));
    assert!(!exists.passed);
    let not_exists = run_check(&project, "XML_XPATH_NOT_EXISTS", json!({ "xpath": "//flow" }));
    assert!(not_exists.passed);
}

// ----------------------------------------------------------------------------
// POM
// ----------------------------------------------------------------------------

#[test]
fn missing_dependency_is_named_by_coordinate() {
    let project = mule_project();
    let outcome = run_check(
        &project,
        "POM_DEPENDENCY_ADDED",
        json!({ "dependencies": [{ "groupId": "org.mule", "artifactId": "mule-core" }] }),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.contains("Required dependency not found: org.mule:mule-core"));
}

#[test]
fn dependency_version_is_resolved_from_pom_properties() {
    let project = mule_project();
    let params = |version: &str| {
        json!({
            "validationType": "DEPENDENCY_EXISTS",
            "dependencies": [{
                "groupId": "org.mule.connectors",
                "artifactId": "mule-http-connector",
                "version": version
            }]
        })
    };
    assert!(run_check(&project, "GENERIC_POM_VALIDATION", params("1.9.3")).passed);

    let wrong = run_check(&project, "GENERIC_POM_VALIDATION", params("1.10.0"));
    assert!(!wrong.passed);
    assert!(wrong.message.contains("has version '1.9.3', expected '1.10.0'"));
}

#[test]
fn unversioned_dependency_takes_managed_version() {
    let project = TempProject::new();
    project.write(
        "pom.xml",
        r#"<project>
  <dependencies>
    <dependency><groupId>org.mule</groupId><artifactId>mule-core</artifactId></dependency>
  </dependencies>
  <dependencyManagement><dependencies>
    <dependency>
      <groupId>org.mule</groupId><artifactId>mule-core</artifactId><version>4.1.0</version>
    </dependency>
  </dependencies></dependencyManagement>
  <build>
    <plugins><plugin><artifactId>maven-jar-plugin</artifactId></plugin></plugins>
    <pluginManagement><plugins>
      <plugin><artifactId>maven-jar-plugin</artifactId><version>3.3.0</version></plugin>
    </plugins></pluginManagement>
  </build>
</project>"#,
    );

    let dependency = run_check(
        &project,
        "GENERIC_POM_VALIDATION",
        json!({
            "validationType": "DEPENDENCY_EXISTS",
            "dependencies": [
                { "groupId": "org.mule", "artifactId": "mule-core", "version": "4.1.0" }
            ]
        }),
    );
    assert!(dependency.passed, "{}", dependency.message);

    let plugin = run_check(
        &project,
        "GENERIC_POM_VALIDATION",
        json!({
            "validationType": "PLUGIN_EXISTS",
            "plugins": ["org.apache.maven.plugins:maven-jar-plugin:3.3.0"]
        }),
    );
    assert!(plugin.passed, "{}", plugin.message);
}

#[test]
fn required_dependencies_honour_require_all() {
    let project = mule_project();
    let params = |require_all: bool| {
        json!({
            "dependencies": ["org.mule.connectors:mule-http-connector", "org.mule:mule-core"],
            "requireAll": require_all
        })
    };

    let all = run_check(&project, "POM_DEPENDENCY_ADDED", params(true));
    assert!(!all.passed);
    assert!(all.message.contains("Required dependency not found: org.mule:mule-core"));

    let any = run_check(&project, "POM_DEPENDENCY_ADDED", params(false));
    assert!(any.passed, "{}", any.message);

    let none = run_check(
        &project,
        "POM_DEPENDENCY_ADDED",
        json!({ "dependencies": ["org.mule:mule-core", "org.mule:mule-db"], "requireAll": false }),
    );
    assert!(!none.passed);
    assert!(none.message.contains("org.mule:mule-core"));
    assert!(none.message.contains("org.mule:mule-db"));
}

#[test]
fn plugin_min_version_uses_version_ordering() {
    let project = mule_project();
    let params = |min: &str| {
        json!({
            "validationType": "PLUGIN_EXISTS",
            "plugins": [{
                "groupId": "org.mule.tools.maven",
                "artifactId": "mule-maven-plugin",
                "minVersion": min
            }]
        })
    };
    assert!(run_check(&project, "GENERIC_POM_VALIDATION", params("4.0.10")).passed);
    assert!(!run_check(&project, "GENERIC_POM_VALIDATION", params("4.1.10")).passed);
}

#[test]
fn removed_plugin_accepts_short_coordinates() {
    let project = mule_project();
    let outcome = run_check(
        &project,
        "POM_PLUGIN_REMOVED",
        json!({ "plugins": ["org.mule.tools.maven:mule-maven-plugin"] }),
    );
    assert!(!outcome.passed);
    assert!(
        outcome
            .message
            .contains("Forbidden plugin found: org.mule.tools.maven:mule-maven-plugin")
    );
}

#[test]
fn legacy_property_form_checks_expected_value() {
    let project = mule_project();
    let ok = run_check(
        &project,
        "POM_PROPERTY",
        json!({ "property": "mule.maven.plugin.version", "expectedValue": "4.1.1" }),
    );
    assert!(ok.passed, "{}", ok.message);

    let wrong = run_check(
        &project,
        "POM_PROPERTY",
        json!({ "properties": [{ "name": "http.connector.version", "value": "1.10.0" }] }),
    );
    assert!(!wrong.passed);
    assert!(wrong.message.contains("Expected: '1.10.0', Found: '1.9.3'"));
}

#[test]
fn plugin_version_property_falls_back_to_plugin_configuration() {
    let project = TempProject::new();
    project.write(
        "pom.xml",
        r#"<project>
  <build><plugins><plugin>
    <groupId>org.mule.tools.maven</groupId>
    <artifactId>mule-maven-plugin</artifactId>
    <configuration><version>4.2.0</version></configuration>
  </plugin></plugins></build>
</project>"#,
    );
    let outcome = run_check(
        &project,
        "POM_PROPERTY",
        json!({ "property": "mule.maven.plugin.version", "expectedValue": "4.2.0" }),
    );
    assert!(outcome.passed, "{}", outcome.message);
}

#[test]
fn parent_version_pattern_uses_wildcards() {
    let project = mule_project();
    let params = |artifact: &str| {
        json!({ "groupId": "com.acme", "artifactId": artifact, "versionPattern": "2.*" })
    };
    assert!(run_check(&project, "POM_PARENT", params("mule-parent")).passed);

    let wrong = run_check(&project, "POM_PARENT", params("other-parent"));
    assert!(!wrong.passed);
    assert!(wrong.message.contains("Parent mismatch"));
}

#[test]
fn missing_descriptor_fails_exists_and_passes_not_exists() {
    let project = TempProject::new();
    let dependency = json!({ "dependencies": ["org.mule:mule-core"] });
    assert!(!run_check(&project, "POM_DEPENDENCY_ADDED", dependency.clone()).passed);
    assert!(run_check(&project, "POM_DEPENDENCY_REMOVED", dependency).passed);
}

#[test]
fn unparseable_descriptor_fails_with_file_name() {
    let project = TempProject::new();
    project.write("pom.xml", "<project><dependencies></project>");
    let outcome = run_check(
        &project,
        "POM_DEPENDENCY_REMOVED",
        json!({ "dependencies": ["org.mule:mule-core"] }),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.starts_with("Error parsing pom.xml"));
}

// ----------------------------------------------------------------------------
// Property files
// ----------------------------------------------------------------------------

fn envs(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_key_names_property_and_relative_path() {
    let project = TempProject::new();
    project.write("src/main/resources/dev.properties", "http.port=8081\n");
    let outcome = run_check(
        &project,
        "CONFIG_PROPERTY_EXISTS",
        json!({
            "fileExtensions": [".properties"],
            "environments": ["dev"],
            "propertyNames": ["http.port", "timeout"]
        }),
    );
    assert!(!outcome.passed);
    assert_eq!(
        outcome.message,
        "Validation failures:\n• Property 'timeout' not found in file: src/main/resources/dev.properties"
    );
}

#[test]
fn property_names_honour_require_all() {
    let project = TempProject::new();
    project.write("src/main/resources/dev.properties", "timeout=30\n");
    let params = |require_all: bool| {
        json!({
            "fileExtensions": [".properties"],
            "environments": ["dev"],
            "propertyNames": ["timeout", "missing.key"],
            "requireAll": require_all
        })
    };

    let all = run_check(&project, "GENERIC_PROPERTY_FILE", params(true));
    assert!(!all.passed);
    assert!(all.message.contains("Property 'missing.key' not found"));

    let any = run_check(&project, "GENERIC_PROPERTY_FILE", params(false));
    assert!(any.passed, "{}", any.message);
}

#[test]
fn allowed_values_are_matched_with_per_property_case() {
    let project = TempProject::new();
    project
        .write("config/qa.yaml.properties", "ignored=1\n")
        .write("config/qa.properties", "log.level=info\nmode=Strict\n");
    let params = json!({
        "fileExtensions": "properties",
        "environments": ["qa"],
        "properties": [
            { "name": "log.level", "values": ["INFO", "WARN"], "caseSensitiveValue": false },
            { "name": "mode", "values": ["strict"] }
        ]
    });

    let outcome = run_check(&project, "MANDATORY_PROPERTY_VALUE_CHECK", params);
    assert!(!outcome.passed);
    assert_eq!(
        outcome.message,
        "Validation failures:\n• Property 'mode' found but value does not match expected values [strict] in file: config/qa.properties"
    );
}

#[test]
fn environments_come_from_context_when_params_omit_them() {
    let project = TempProject::new();
    project
        .write("src/main/resources/dev.properties", "timeout=30\n")
        .write("src/main/resources/prod.properties", "timeout=60\n");
    let params = json!({ "fileExtensions": [".properties"], "propertyNames": ["timeout"] });
    let global = envs(&["dev", "prod"]);

    let outcome = run_check_with_envs(
        &project,
        "GENERIC_PROPERTY_FILE",
        params.clone(),
        Some(global.as_slice()),
    );
    assert!(outcome.passed, "{}", outcome.message);
    assert!(outcome.message.contains("2 file(s)"));

    let without = run_check(&project, "GENERIC_PROPERTY_FILE", params);
    assert!(!without.passed);
}

#[test]
fn no_environment_files_fail_with_context() {
    let project = TempProject::new();
    project.write("src/main/resources/local.properties", "a=1\n");
    let outcome = run_check(
        &project,
        "GENERIC_PROPERTY_FILE",
        json!({
            "fileExtensions": [".properties"],
            "environments": ["dev"],
            "propertyNames": ["a"]
        }),
    );
    assert!(!outcome.passed);
    assert_eq!(
        outcome.message,
        "No property files found for environments [dev] with extensions [.properties]"
    );
}

#[test]
fn substring_mode_searches_raw_text() {
    let project = TempProject::new();
    project.write("dev.policy", "client-id-enforcement: enabled\n");
    let params = |needle: &str| {
        json!({
            "fileExtensions": [".policy"],
            "environments": ["dev"],
            "propertyNames": [needle],
            "caseSensitive": false
        })
    };
    assert!(run_check(&project, "CONFIG_POLICY_EXISTS", params("Client-ID-Enforcement")).passed);
    assert!(!run_check(&project, "MANDATORY_SUBSTRING_CHECK", params("rate-limiting")).passed);
}

#[test]
fn regex_mode_requires_full_line_match() {
    let project = TempProject::new();
    project.write(
        "dev.properties",
        "# db.pool.size=1\ndb.pool.size=25\napi.timeout=30000ms\n",
    );
    let params = |patterns: &[&str]| {
        json!({
            "fileExtensions": [".properties"],
            "environments": ["dev"],
            "parseMode": "regex_pattern",
            "regexPatterns": patterns
        })
    };

    let ok = run_check(&project, "GENERIC_PROPERTY_FILE", params(&["db\\.pool\\.size=\\d+"]));
    assert!(ok.passed, "{}", ok.message);

    let partial = run_check(&project, "GENERIC_PROPERTY_FILE", params(&["api\\.timeout=\\d+"]));
    assert!(!partial.passed);
    assert!(
        partial
            .message
            .contains("Pattern 'api\\.timeout=\\d+' not matched in file: dev.properties")
    );
}

// ----------------------------------------------------------------------------
// JSON
// ----------------------------------------------------------------------------

const MULE_ARTIFACT: &str = r#"{
  "minMuleVersion": "4.3.0",
  "javaSpecificationVersions": ["1.8"],
  "secureProperties": ["db.password"],
  "requiredProduct": "MULE_EE",
  "redeploymentEnabled": false
}"#;

#[test]
fn min_versions_compare_semantically() {
    let project = TempProject::new();
    project.write("mule-artifact.json", MULE_ARTIFACT);

    let low = run_check(
        &project,
        "MULE_ARTIFACT_JSON_FULL",
        json!({ "minVersions": { "minMuleVersion": "4.4.0" } }),
    );
    assert!(!low.passed);
    assert!(low.message.contains(
        "Field 'minMuleVersion' version too low in mule-artifact.json: expected >= 4.4.0, got 4.3.0"
    ));

    let ok = run_check(
        &project,
        "MULE_ARTIFACT_JSON_FULL",
        json!({ "minVersions": { "minMuleVersion": "4.2.10" } }),
    );
    assert!(ok.passed, "{}", ok.message);
}

#[test]
fn required_fields_compare_scalars_by_text() {
    let project = TempProject::new();
    project.write("mule-artifact.json", MULE_ARTIFACT);
    let outcome = run_check(
        &project,
        "JSON_VALIDATION_REQUIRED",
        json!({
            "filePattern": "mule-artifact.json",
            "requiredFields": { "requiredProduct": "MULE_EE", "redeploymentEnabled": true },
            "requiredElements": ["javaSpecificationVersions", "name"]
        }),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.contains(
        "Field 'redeploymentEnabled' has wrong value in mule-artifact.json: expected 'true', got 'false'"
    ));
    assert!(outcome.message.contains("Element 'name' missing in mule-artifact.json"));
    assert!(!outcome.message.contains("requiredProduct"));
}

#[test]
fn required_json_criteria_honour_require_all() {
    let project = TempProject::new();
    project.write("mule-artifact.json", MULE_ARTIFACT);
    let params = |require_all: bool| {
        json!({
            "filePattern": "mule-artifact.json",
            "requiredElements": ["minMuleVersion", "name"],
            "requireAll": require_all
        })
    };

    let all = run_check(&project, "JSON_VALIDATION_REQUIRED", params(true));
    assert!(!all.passed);
    assert!(all.message.contains("Element 'name' missing in mule-artifact.json"));

    let any = run_check(&project, "JSON_VALIDATION_REQUIRED", params(false));
    assert!(any.passed, "{}", any.message);

    let forbidden_still_applies = run_check(
        &project,
        "JSON_VALIDATION_REQUIRED",
        json!({
            "filePattern": "mule-artifact.json",
            "requiredElements": ["minMuleVersion", "name"],
            "forbiddenElements": ["secureProperties"],
            "requireAll": false
        }),
    );
    assert!(!forbidden_still_applies.passed);
}

#[test]
fn forbidden_elements_and_values() {
    let project = TempProject::new();
    project.write("mule-artifact.json", MULE_ARTIFACT);
    let outcome = run_check(
        &project,
        "JSON_VALIDATION_FORBIDDEN",
        json!({
            "filePattern": "mule-artifact.json",
            "forbiddenElements": ["secureProperties"],
            "forbiddenFieldValues": [{ "field": "minMuleVersion", "forbiddenValue": "4.3.0" }]
        }),
    );
    assert!(!outcome.passed);
    assert!(
        outcome
            .message
            .contains("Forbidden field 'secureProperties' present in mule-artifact.json")
    );
    assert!(outcome.message.contains("Forbidden value '4.3.0' found for field 'minMuleVersion'"));
}

#[test]
fn json_no_files_depends_on_criteria() {
    let project = TempProject::new();
    let forbidden = run_check(
        &project,
        "JSON_VALIDATION_FORBIDDEN",
        json!({ "filePattern": "mule-artifact.json", "forbiddenElements": ["x"] }),
    );
    assert!(forbidden.passed);

    let required = run_check(
        &project,
        "JSON_VALIDATION_REQUIRED",
        json!({ "filePattern": "mule-artifact.json", "requiredElements": ["x"] }),
    );
    assert!(!required.passed);
}

#[test]
fn json_parse_errors_name_the_file() {
    let project = TempProject::new();
    project.write("mule-artifact.json", "{ \"minMuleVersion\": ");
    let outcome = run_check(
        &project,
        "MULE_ARTIFACT_JSON_FULL",
        json!({ "requiredElements": ["minMuleVersion"] }),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.contains("Error parsing JSON file mule-artifact.json"));
}
