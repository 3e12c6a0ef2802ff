use crate::checks::Outcome;
use crate::context::{Project, RuleContext};
use crate::dispatch;
use camino::{Utf8Path, Utf8PathBuf};
use muleguard_types::{Check, Rule};
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway project tree on disk.
pub struct TempProject {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl TempProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        self
    }
}

pub fn check(check_type: &str, params: Value) -> Check {
    Check::new(check_type, params)
}

pub fn rule(id: &str, checks: Vec<Check>) -> Rule {
    Rule {
        id: id.to_string(),
        name: format!("{id} name"),
        description: String::new(),
        enabled: true,
        severity: "HIGH".to_string(),
        checks,
    }
}

/// Dispatches and runs a single check against `project`, panicking on configuration errors.
pub fn run_check(project: &TempProject, check_type: &str, params: Value) -> Outcome {
    run_check_with_envs(project, check_type, params, None)
}

pub fn run_check_with_envs(
    project: &TempProject,
    check_type: &str,
    params: Value,
    environments: Option<&[String]>,
) -> Outcome {
    let matcher = dispatch::dispatch(&check(check_type, params)).expect("check dispatches");
    let ctx = RuleContext {
        rule_id: "RULE-TEST",
        environments,
    };
    matcher.run(&Project::new(project.root()), &ctx)
}

pub const POM_WITH_DEPENDENCIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>com.acme</groupId>
    <artifactId>mule-parent</artifactId>
    <version>2.1.0</version>
  </parent>
  <groupId>com.acme</groupId>
  <artifactId>orders-api</artifactId>
  <version>1.0.0</version>
  <properties>
    <mule.maven.plugin.version>4.1.1</mule.maven.plugin.version>
    <http.connector.version>1.9.3</http.connector.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.mule.connectors</groupId>
      <artifactId>mule-http-connector</artifactId>
      <version>${http.connector.version}</version>
      <classifier>mule-plugin</classifier>
    </dependency>
  </dependencies>
  <build>
    <plugins>
      <plugin>
        <groupId>org.mule.tools.maven</groupId>
        <artifactId>mule-maven-plugin</artifactId>
        <version>${mule.maven.plugin.version}</version>
      </plugin>
    </plugins>
  </build>
</project>
"#;

pub const MULE_FLOW: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<mule xmlns="http://www.mulesoft.org/schema/mule/core"
      xmlns:http="http://www.mulesoft.org/schema/mule/http"
      xmlns:ibm-mq="http://www.mulesoft.org/schema/mule/ibm-mq">
  <http:listener-config name="api-httpListenerConfig">
    <http:listener-connection host="0.0.0.0" port="${http.port}"/>
  </http:listener-config>
  <ibm-mq:config name="mq" cipherSuite="${mq.cipher}"/>
  <flow name="orders-main">
    <http:listener config-ref="api-httpListenerConfig" path="/orders"/>
    <logger level="INFO" message="#[payload]"/>
  </flow>
</mule>
"##;
