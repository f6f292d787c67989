// This test should FAIL to compile
// Applying the pledge filter a second time from Sandboxed

use clockshim::sandbox::PolicyFlags;
use clockshim::startup::ProcessSetup;
use clockshim::testing::RecordingEnforcer;
use clockshim::SandboxRole;

fn main() {
    let mut enforcer = RecordingEnforcer::default();
    let setup = ProcessSetup::new(SandboxRole::MainProcess)
        .enable_syscall_filter(1, PolicyFlags::default(), &mut enforcer)
        .expect("filter failed");

    // Sandboxed has no further transitions
    setup.enable_syscall_filter(1, PolicyFlags::default(), &mut enforcer);
}
