use std::fs;
use assert_cmd::Command;
use tempfile::tempdir;

#[test]
fn interactive_session() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("pktgen")?;
    cmd.arg("--num-flows")
        .arg("200")
        .arg("--num-cores")
        .arg("2")
        .write_stdin("rate 10000\nchurn 120\nstart\nstats\nstop\nreset\nquit\n");
    let output = cmd.assert().success().get_output().clone();

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Pktgen> "));
    assert!(stdout.contains("Packets:"));
    assert!(stdout.contains("Final statistics:"));

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("5 Gbps per core"));
    assert!(stderr.contains("flow TTL is 100000000000 ns"));
    Ok(())
}

#[test]
fn invalid_command_keeps_session() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("pktgen")?;
    cmd.write_stdin("rate -3\nchurn\nquit\n");
    let output = cmd.assert().success().get_output().clone();
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("error"));
    assert!(stdout.contains("Final statistics:"));
    Ok(())
}

#[test]
fn configuration_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let file_path = dir.path().join("pktgen.toml");
    fs::write(&file_path, "num_flows = 1000\nnum_cores = 4\nchurn = 600\n")?;

    let mut cmd = Command::cargo_bin("pktgen")?;
    cmd.arg("-c").arg(&file_path).write_stdin("quit\n");
    let output = cmd.assert().success().get_output().clone();
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("4 workers ready for 1000 flows"));
    Ok(())
}

#[test]
fn zero_cores_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("pktgen")?;
    cmd.arg("--num-cores").arg("0").write_stdin("quit\n");
    cmd.assert().failure().code(1);
    Ok(())
}

#[test]
fn ill_formed_configuration_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let file_path = dir.path().join("pktgen.toml");
    fs::write(&file_path, "num_flows = -4\n")?;

    let mut cmd = Command::cargo_bin("pktgen")?;
    cmd.arg("--config").arg(&file_path);
    cmd.assert().failure().code(1);
    Ok(())
}
