use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const COMPARE_BUFFER_SIZE: usize = 8 * 1024;

/// Byte-exact comparison of two files, tolerant of either file having gone
/// missing since it was catalogued.
///
/// `compare(a, b) == 0` iff both files exist and have byte-identical
/// contents. The sign returned on inequality carries no ordering meaning
/// beyond "not equal" -- callers must never sort by it.
pub fn compare(p1: &Path, p2: &Path) -> i32 {
    let f1 = match File::open(p1) {
        Ok(f) => f,
        Err(_) => return -1,
    };
    let f2 = match File::open(p2) {
        Ok(f) => f,
        Err(_) => return 1,
    };

    let len1 = match f1.metadata() {
        Ok(m) => m.len(),
        Err(_) => return -1,
    };
    let len2 = match f2.metadata() {
        Ok(m) => m.len(),
        Err(_) => return -1,
    };
    match len1.cmp(&len2) {
        Ordering::Less => return -1,
        Ordering::Greater => return 1,
        Ordering::Equal => {},
    }

    let mut r1 = BufReader::with_capacity(COMPARE_BUFFER_SIZE, f1);
    let mut r2 = BufReader::with_capacity(COMPARE_BUFFER_SIZE, f2);
    let mut buf1 = [0u8; COMPARE_BUFFER_SIZE];
    let mut buf2 = [0u8; COMPARE_BUFFER_SIZE];

    loop {
        let n1 = match read_fill(&mut r1, &mut buf1) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("read error while comparing {}: {}", p1.display(), e);
                return -1;
            },
        };
        let n2 = match read_fill(&mut r2, &mut buf2) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("read error while comparing {}: {}", p2.display(), e);
                return -1;
            },
        };

        if n1 != n2 {
            return -1;
        }
        if n1 == 0 {
            return 0;
        }
        if buf1[..n1] != buf2[..n2] {
            return -1;
        }
    }
}

/// Reads up to `buf.len()` bytes, stopping short only at EOF (unlike
/// `Read::read`, which may return fewer bytes than available).
fn read_fill(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
