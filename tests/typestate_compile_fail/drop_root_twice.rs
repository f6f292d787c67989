// This test should FAIL to compile
// Dropping root a second time from RootDropped

use clockshim::startup::ProcessSetup;
use clockshim::testing::RecordingLauncher;
use clockshim::SandboxRole;

fn main() {
    let mut launcher = RecordingLauncher::default();
    let setup = ProcessSetup::new(SandboxRole::MainProcess)
        .drop_root(1000, 1000, &mut launcher)
        .expect("drop failed");

    setup.drop_root(1000, 1000, &mut launcher);
}
