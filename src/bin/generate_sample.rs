use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

/// Seeded xoshiro256** generator, so every run writes the same sample files.
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniformly chosen element of a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One sales record; `amount` is `None` where the value is missing.
struct Sale {
    date: String,
    amount: Option<f64>,
    region: &'static str,
    units: i64,
}

fn generate_sales(rng: &mut SimpleRng, n: usize) -> Vec<Sale> {
    let regions = ["north", "south", "east", "west"];
    let mut sales: Vec<Sale> = (0..n)
        .map(|i| {
            let amount = (rng.next_f64() * 500.0 * 100.0).round() / 100.0;
            Sale {
                date: format!("2024-01-{:02}", i % 28 + 1),
                // Roughly one in eight amounts is missing.
                amount: (rng.next_f64() >= 0.125).then_some(amount),
                region: *rng.pick(&regions),
                units: 1 + (rng.next_u64() % 20) as i64,
            }
        })
        .collect();

    // Repeat a few rows verbatim so there is something to deduplicate.
    for i in (0..n).step_by(7) {
        let dup = Sale {
            date: sales[i].date.clone(),
            amount: sales[i].amount,
            region: sales[i].region,
            units: sales[i].units,
        };
        sales.push(dup);
    }
    sales
}

const HEADERS: [&str; 4] = ["date", "amount", "region", "units"];

fn write_csv(path: &str, sales: &[Sale]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for sale in sales {
        writer.write_record([
            sale.date.clone(),
            sale.amount.map(|a| a.to_string()).unwrap_or_default(),
            sale.region.to_string(),
            sale.units.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_xlsx(path: &str, sales: &[Sale]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, sale) in sales.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &sale.date)?;
        if let Some(amount) = sale.amount {
            sheet.write_number(row, 1, amount)?;
        }
        sheet.write_string(row, 2, sale.region)?;
        sheet.write_number(row, 3, sale.units as f64)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let sales = generate_sales(&mut rng, 40);

    write_csv("sample_sales.csv", &sales)?;
    write_xlsx("sample_sales.xlsx", &sales)?;

    println!(
        "Wrote {} sales rows to sample_sales.csv and sample_sales.xlsx",
        sales.len()
    );
    Ok(())
}
