#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const CMSIS_PDSC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package schemaVersion="1.7.7">
  <vendor>ARM</vendor>
  <name>CMSIS</name>
  <description>CMSIS (Common Microcontroller Software Interface Standard)</description>
  <releases>
    <release version="5.8.0">Active development</release>
  </releases>
  <components>
    <component Cclass="CMSIS" Cgroup="CORE" Cversion="5.5.0">
      <description>CMSIS-CORE for Cortex-M</description>
    </component>
    <component Cclass="CMSIS" Cgroup="RTOS2" Csub="Keil RTX5" Cvariant="Library" Cversion="5.5.3">
      <description>CMSIS-RTOS2 RTX5 for Cortex-M</description>
    </component>
  </components>
</package>
"#;

pub const DFP_PDSC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package schemaVersion="1.7.7">
  <vendor>ARM</vendor>
  <name>RteTest_DFP</name>
  <description>Device family pack for testing</description>
  <releases>
    <release version="0.2.0">Initial release</release>
  </releases>
  <devices>
    <family Dfamily="RteTest ARM Cortex M" Dvendor="ARM:82">
      <device Dname="RteTest_ARMCM3">
        <processor Pname="cm3" Dcore="Cortex-M3"/>
      </device>
      <device Dname="RteTest_ARMCM4">
        <processor Dcore="Cortex-M4"/>
        <variant Dvariant="RteTest_ARMCM4_FP"/>
        <variant Dvariant="RteTest_ARMCM4_NOFP"/>
      </device>
    </family>
  </devices>
  <components>
    <component Cclass="Device" Cgroup="Startup" Cvariant="C Startup" Cversion="2.0.3">
      <description>System and startup for the test devices</description>
    </component>
  </components>
</package>
"#;

/// Install a pack description under `<root>/<vendor>/<name>/<version>/`.
pub fn install_pack(root: &Path, vendor: &str, name: &str, version: &str, pdsc: &str) {
    let dir = root.join(vendor).join(name).join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.{}.pdsc", vendor, name)), pdsc).unwrap();
}

/// Pack root holding only ARM::CMSIS@5.8.0.
pub fn cmsis_root() -> TempDir {
    let root = TempDir::new().unwrap();
    install_pack(root.path(), "ARM", "CMSIS", "5.8.0", CMSIS_PDSC);
    root
}

/// Pack root holding ARM::CMSIS@5.8.0 and ARM::RteTest_DFP@0.2.0.
pub fn full_root() -> TempDir {
    let root = cmsis_root();
    install_pack(root.path(), "ARM", "RteTest_DFP", "0.2.0", DFP_PDSC);
    root
}

/// Write a solution with one project using `device`, returning the solution path.
pub fn write_solution(dir: &Path, device: &str) -> PathBuf {
    let app = dir.join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("main.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(
        app.join("app.cproject.yml"),
        r#"project:
  description: Hello world
  components:
    - component: CMSIS:CORE
    - component: Device:Startup&C Startup
  groups:
    - group: Source
      files:
        - file: main.c
"#,
    )
    .unwrap();

    let solution = dir.join("hello.csolution.yml");
    fs::write(
        &solution,
        format!(
            r#"solution:
  description: Hello world solution
  packs:
    - pack: ARM::CMSIS@>=5.8.0
    - pack: ARM::RteTest_DFP
  target-types:
    - type: CM3
      device: {}
  build-types:
    - type: Debug
      debug: on
      optimize: none
    - type: Release
      optimize: size
  projects:
    - project: app/app.cproject.yml
"#,
            device
        ),
    )
    .unwrap();
    solution
}
