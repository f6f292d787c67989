// This test should FAIL to compile
// Switching user after the pledge filter (setuid is outside every promise set)

use clockshim::sandbox::PolicyFlags;
use clockshim::startup::ProcessSetup;
use clockshim::testing::{RecordingEnforcer, RecordingLauncher};
use clockshim::SandboxRole;

fn main() {
    let mut enforcer = RecordingEnforcer::default();
    let mut launcher = RecordingLauncher::default();
    let setup = ProcessSetup::new(SandboxRole::MainProcess)
        .enable_syscall_filter(1, PolicyFlags::default(), &mut enforcer)
        .expect("filter failed");

    setup.drop_root(1000, 1000, &mut launcher);
}
