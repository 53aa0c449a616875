#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write `well_<id>_absorbance.csv` with a reading every 5 minutes from 08:00.
pub fn write_well(dir: &Path, id: &str, od: impl Fn(f64) -> f64, n: usize) -> PathBuf {
    let mut text = String::from("timestamp,absorbance_od600,temperature_c\n");
    for i in 0..n {
        let minutes = i * 5;
        let t_h = minutes as f64 / 60.0;
        text.push_str(&format!(
            "2024-05-01 {:02}:{:02}:00,{:.6},37.0\n",
            8 + minutes / 60,
            minutes % 60,
            od(t_h)
        ));
    }
    let path = dir.join(format!("well_{id}_absorbance.csv"));
    fs::write(&path, text).unwrap();
    path
}

pub fn exponential(k: f64) -> impl Fn(f64) -> f64 {
    move |t| 0.12 * (k * t).exp()
}

pub fn flat(t: f64) -> f64 {
    let _ = t;
    0.3
}

/// A small plate: three growing wells, one flat well and one stray file.
pub fn write_plate(dir: &Path) {
    write_well(dir, "A1", exponential(0.45), 60);
    write_well(dir, "A2", exponential(0.30), 60);
    write_well(dir, "C1", exponential(0.40), 60);
    write_well(dir, "B1", flat, 60);
    fs::write(dir.join("notes.txt"), "not a well").unwrap();
}

pub fn write_file(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

pub const BATCH_1: &str = "destination_well,mix_reps,mix_volume_uL,mix_height_mm
A1,3,80,1.5
A2,5,100,
B1,4,90,2.0
";

pub const BATCH_2: &str = "destination_well,mix_reps,mix_volume_uL
A1,6,120
";
