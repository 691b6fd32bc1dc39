#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

pub const STORES: [&str; 4] = ["SPLT", "TLPS", "PATIO", "KONI"];

#[derive(Debug, Clone, Copy)]
pub enum Cell {
    N(f64),
    T(&'static str),
    Blank,
}

pub struct MovementSheet {
    pub name: &'static str,
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

/// Goals of one store as (goal1, goal2, goal3).
pub type Goals = (f64, f64, f64);

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: Cell) -> Result<(), XlsxError> {
    match cell {
        Cell::N(n) => {
            ws.write_number(row, col, n)?;
        }
        Cell::T(s) => {
            ws.write_string(row, col, s)?;
        }
        Cell::Blank => {}
    }
    Ok(())
}

/// Writes a workbook with the summary sheet first, store names in B3/F3/J3/N3
/// and goals on sheet rows 20, 24 and 28.
pub fn write_workbook(
    path: &Path,
    month: &str,
    goals: [Goals; 4],
    sheets: &[MovementSheet],
) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name("RESUMO")?;
    summary.write_string(1, 3, month)?;
    for (i, store) in STORES.iter().enumerate() {
        let col = (1 + i * 4) as u16;
        summary.write_string(2, col, *store)?;
        let (g1, g2, g3) = goals[i];
        summary.write_number(19, col + 2, g1)?;
        summary.write_number(23, col + 2, g2)?;
        summary.write_number(27, col + 2, g3)?;
    }

    for sheet in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(sheet.name)?;
        for (col, label) in sheet.header.iter().enumerate() {
            ws.write_string(0, col as u16, *label)?;
        }
        for (r, row) in sheet.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                write_cell(ws, (r + 1) as u32, col as u16, *cell)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Four movement sheets with descriptive columns mixed in:
/// SPLT day 1 has PIX=0 and DINHEIRO=150, day 31 only exists in 31-day months.
pub fn standard_sheets() -> Vec<MovementSheet> {
    use Cell::*;
    vec![
        MovementSheet {
            name: "SPLT",
            header: vec!["DIA", "DISCRI", "PIX", "DINHEIRO", "NOME"],
            rows: vec![
                vec![N(1.0), T("venda balcão"), N(0.0), N(150.0), T("ana")],
                vec![N(2.0), Blank, N(80.0), N(20.0), Blank],
                vec![N(31.0), Blank, N(10.0), Blank, Blank],
                vec![T("TOTAL"), Blank, N(90.0), N(170.0), Blank],
            ],
        },
        MovementSheet {
            name: "TLPS",
            header: vec!["DIA", "DISCRI", "PIX", "NOME"],
            rows: vec![vec![N(5.0), T("loja"), N(40.0), T("bia")]],
        },
        MovementSheet {
            name: "PATIO",
            header: vec!["DIA", "DISCRI", "CARTAO", "NOME"],
            rows: vec![vec![N(7.0), Blank, N(25.5), Blank]],
        },
        MovementSheet {
            name: "KONI",
            header: vec!["DIA", "DISCRI", "PIX"],
            rows: vec![vec![N(10.0), Blank, N(60.0)]],
        },
    ]
}

/// Store 1 goal1 = 1000, every other goal cell holds 0.
pub fn standard_goals() -> [Goals; 4] {
    [
        (1000.0, 0.0, 0.0),
        (0.0, 0.0, 0.0),
        (0.0, 0.0, 0.0),
        (0.0, 0.0, 0.0),
    ]
}

pub fn standard_workbook(dir: &Path, month: &str) -> PathBuf {
    let path = dir.join(format!("movimento_{}.xlsx", month.replace('/', "_")));
    write_workbook(&path, month, standard_goals(), &standard_sheets()).unwrap();
    path
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}
