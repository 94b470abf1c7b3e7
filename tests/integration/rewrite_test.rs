//! End-to-end rewrite passes over a fixture project

use fix_imports::{models::config::Settings, RewriteOrchestrator};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };

        // converted files
        project.write("app/models/user.js", "export default class User {}\n");
        project.write("app/lib/format.js", "module.exports = { pad };\n");
        project.write("app/lib/strings.js", "export default { trim };\n");

        // parseable consumers
        project.write(
            "app/views/profile.js",
            "import User from '../models/user.coffee';\nimport fmt from 'lib/format.js.coffee';\nimport other from './other.coffee';\n",
        );
        project.write(
            "app/index.jsx",
            "export { default as User } from \"./models/user.coffee\";\nexport * from './lib/strings.coffee';\nconst f = () => require('./lib/format.coffee');\n",
        );
        project.write("app/views/other.coffee", "module.exports = 1\n");

        // legacy consumers
        project.write(
            "app/controllers/session.coffee",
            "User = require('../models/user.coffee')\nFormat = require(\"../lib/format\")\nagain = require('../models/user.coffee')\n",
        );
        project.write("app/controllers/plain.coffee", "x = 1\n");

        // excluded tree
        project.write("node_modules/pkg/user.js", "require('../../app/models/user.coffee')\n");

        project
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }

    fn converted(&self) -> Vec<PathBuf> {
        ["app/models/user.js", "app/lib/format.js", "app/lib/strings.js"]
            .iter()
            .map(|rel| self.path(rel))
            .collect()
    }

    fn settings(&self) -> Settings {
        Settings {
            search_path: self.root().to_path_buf(),
            absolute_import_paths: vec![self.path("app")],
            concurrency: Some(2),
            show_progress: false,
            ..Settings::default()
        }
    }
}

#[test]
fn test_full_pass_rewrites_every_reference() {
    let project = Project::new();
    let report = RewriteOrchestrator::new(project.settings())
        .unwrap()
        .run(&project.converted())
        .unwrap();

    assert_eq!(
        project.read("app/views/profile.js"),
        "import User from '../models/user';\nimport fmt from 'lib/format';\nimport other from './other.coffee';\n"
    );
    assert_eq!(
        project.read("app/index.jsx"),
        "export { default as User } from \"./models/user\";\nexport * from './lib/strings';\nconst f = () => require('./lib/format');\n"
    );
    assert_eq!(
        project.read("app/controllers/session.coffee"),
        "User = require('../models/user').default\nFormat = require(\"../lib/format\")\nagain = require('../models/user.coffee')\n"
    );
    assert_eq!(project.read("app/controllers/plain.coffee"), "x = 1\n");
    assert_eq!(
        project.read("node_modules/pkg/user.js"),
        "require('../../app/models/user.coffee')\n"
    );

    assert_eq!(report.converted_files, 3);
    assert_eq!(report.default_exports, 2);
    assert_eq!(report.structural_rewrites.len(), 2);
    assert_eq!(report.legacy_rewrites, vec![project.path("app/controllers/session.coffee")]);
    assert_eq!(report.rewritten_files().len(), 3);
    assert!(!report.has_failures());
}

#[test]
fn test_second_run_changes_nothing() {
    let project = Project::new();
    let orchestrator = RewriteOrchestrator::new(project.settings()).unwrap();

    let first = orchestrator.run(&project.converted()).unwrap();
    assert!(!first.rewritten_files().is_empty());
    let snapshot = project.read("app/controllers/session.coffee");

    let second = orchestrator.run(&project.converted()).unwrap();
    assert!(second.rewritten_files().is_empty());
    assert_eq!(project.read("app/controllers/session.coffee"), snapshot);
}

#[test]
fn test_dry_run_reports_without_writing() {
    let project = Project::new();
    let before = project.read("app/views/profile.js");

    let settings = Settings {
        dry_run: true,
        ..project.settings()
    };
    let report = RewriteOrchestrator::new(settings)
        .unwrap()
        .run(&project.converted())
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.rewritten_files().len(), 3);
    assert_eq!(project.read("app/views/profile.js"), before);
}

#[test]
fn test_parse_failure_is_isolated() {
    let project = Project::new();
    project.write("app/broken.js", "import User from './models/user.coffee'\nlet = ;\n");

    let report = RewriteOrchestrator::new(project.settings())
        .unwrap()
        .run(&project.converted())
        .unwrap();

    assert!(report.has_failures());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, project.path("app/broken.js"));
    assert!(project.read("app/views/profile.js").contains("'../models/user'"));
}

#[test]
fn test_builtin_named_pass_strips_every_legacy_specifier() {
    let project = Project::new();
    let settings = Settings {
        named_transform_passes: vec!["remove-coffee-from-imports".to_string()],
        ..project.settings()
    };

    let report = RewriteOrchestrator::new(settings)
        .unwrap()
        .run(&project.converted())
        .unwrap();

    // './other.coffee' is not converted but the named pass strips it anyway
    assert!(project.read("app/views/profile.js").contains("from './other';"));
    assert_eq!(report.pass_rewrites.len(), 1);
    assert_eq!(report.pass_rewrites[0].files, vec![project.path("app/views/profile.js")]);
}

#[cfg(unix)]
#[test]
fn test_failing_external_pass_does_not_stop_legacy_stage() {
    use std::os::unix::fs::PermissionsExt;

    let project = Project::new();
    let tool = project.path("tools/broken-pass");
    project.write("tools/broken-pass", "#!/bin/sh\necho 'cannot transform' >&2\nexit 1\n");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let settings = Settings {
        named_transform_passes: vec![tool.display().to_string()],
        ..project.settings()
    };
    let report = RewriteOrchestrator::new(settings)
        .unwrap()
        .run(&project.converted())
        .unwrap();

    assert_eq!(report.pass_failures.len(), 1);
    assert!(report.pass_failures[0].message.contains("cannot transform"));
    assert!(report.has_failures());
    assert!(project
        .read("app/controllers/session.coffee")
        .starts_with("User = require('../models/user').default\n"));
}

#[cfg(unix)]
#[test]
fn test_external_pass_receives_payload_and_candidates() {
    use fix_imports::TransformPayload;
    use std::os::unix::fs::PermissionsExt;

    let project = Project::new();
    let capture = project.path("captured-args");
    let tool = project.path("tools/record-pass");
    project.write(
        "tools/record-pass",
        &format!("#!/bin/sh\nfor arg in \"$@\"; do echo \"$arg\" >> '{}'; done\n", capture.display()),
    );
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let settings = Settings {
        named_transform_passes: vec![tool.display().to_string()],
        ..project.settings()
    };
    let report = RewriteOrchestrator::new(settings)
        .unwrap()
        .run(&project.converted())
        .unwrap();
    assert!(report.pass_failures.is_empty());
    assert!(report.pass_rewrites[0].files.is_empty());

    let captured = fs::read_to_string(&capture).unwrap();
    let mut lines = captured.lines();
    let encoded = lines
        .next()
        .and_then(|first| first.strip_prefix("--encoded-options="))
        .unwrap();
    let payload = TransformPayload::decode(encoded).unwrap();
    assert_eq!(payload.converted_files.len(), 3);
    assert_eq!(payload.absolute_import_paths, vec![project.path("app")]);
    assert!(lines.any(|line| line.ends_with("profile.js")));
}
