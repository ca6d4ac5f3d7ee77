// Various file tools needed throughout the code.
use log::warn;
use std::fs::File;
use std::io::{BufRead, Error};
use std::path::Path;
use std::{fs, io};

pub fn read_lines(filename: &str) -> io::Result<io::Lines<io::BufReader<File>>> {
    // This creates a buffer to read lines
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

pub fn open_file(filename: &str, overwrite_file: bool) -> Result<File, Error> {
    if overwrite_file && Path::new(filename).exists() {
        File::options().create(true).write(true).truncate(true).open(filename)
    } else {
        File::options().create_new(true).append(true).open(filename)
    }
}

pub fn check_parent(filename: &str) -> io::Result<&Path> {
    // checks that the parent dir exists and then if so creates the Path object open
    // and ready to write
    let file_path = Path::new(filename);
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            check_create_dir(parent)?;
        }
    }
    Ok(file_path)
}

pub fn check_create_dir(dir_to_check: &Path) -> io::Result<()> {
    if !dir_to_check.is_dir() {
        warn!("Directory not found, creating: {:?}", dir_to_check);
        fs::create_dir_all(dir_to_check)?;
    }
    Ok(())
}
