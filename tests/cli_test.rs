use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::Path;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn make_dawg(out_path: &Path) -> STDRESULT {
    let mut cmd = Command::cargo_bin("lexdawg")?;
    let in_path = Path::new("tests").join("seven.txt");
    let output = cmd.arg("make")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(out_path)
        .arg("-n").arg("seven word lexicon")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(predicate::str::contains("NUMBER OF WORDS: 7").eval(&stdout));
    assert!(predicate::str::contains("AFTER COMPRESSION").eval(&stdout));
    Ok(())
}

fn query(dawg_path: &Path,word: &str,reverse: bool) -> Result<String,Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("lexdawg")?;
    cmd.arg("query")
        .arg("-i").arg(dawg_path)
        .arg("-w").arg(word);
    if reverse {
        cmd.arg("-r");
    }
    let output = cmd.output()?;
    assert!(output.status.success());
    Ok(String::from_utf8(output.stdout)?)
}

#[test]
fn make_and_inspect() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let out_path = temp_dir.path().join("seven.lxd");
    make_dawg(&out_path)?;
    let mut cmd = Command::cargo_bin("lexdawg")?;
    let output = cmd.arg("info")
        .arg("-i").arg(&out_path)
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(predicate::str::contains("Lexicon Name: seven word lexicon").eval(&stdout));
    assert!(predicate::str::contains("Number of Nodes: 32").eval(&stdout));
    assert!(predicate::str::contains("Number of Words: 7").eval(&stdout));
    assert!(predicate::str::contains("Number of Reverse Part Words: 13").eval(&stdout));
    Ok(())
}

#[test]
fn query_forward_words() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let out_path = temp_dir.path().join("seven.lxd");
    make_dawg(&out_path)?;
    for word in ["BAT","BATS","CAR","CARS","CAT","CATS","FAT"] {
        assert!(query(&out_path,word,false)?.contains(": found"));
    }
    // lower case input is uppercased before lookup
    assert!(query(&out_path,"cat",false)?.contains("CAT: found"));
    assert!(query(&out_path,"BA",false)?.contains(": not found"));
    assert!(query(&out_path,"BATH",false)?.contains(": not found"));
    Ok(())
}

#[test]
fn query_reverse_part_words() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let out_path = temp_dir.path().join("seven.lxd");
    make_dawg(&out_path)?;
    assert!(query(&out_path,"TAB",true)?.contains(": found"));
    assert!(query(&out_path,"STAC",true)?.contains(": found"));
    assert!(query(&out_path,"ZZ",true)?.contains(": not found"));
    // reverse part words are not forward words
    assert!(query(&out_path,"TAB",false)?.contains(": not found"));
    Ok(())
}
