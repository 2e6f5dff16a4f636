use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};

/// The five canned datasets the mock backend serves. Generation is
/// deterministic (fixed seed per dataset) so row shapes are reproducible
/// across runs and in tests.
pub const DATASET_KEYS: [&str; 5] = [
    "SELECT * FROM users",
    "SELECT * FROM orders",
    "SELECT * FROM products",
    "SELECT * FROM employees",
    "SELECT * FROM transactions",
];

const BASE_DATE: (i32, u32, u32) = (2024, 1, 1);

/// xorshift64*: enough randomness for mock rows, same sequence every run.
struct MockRng(u64);

impl MockRng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next() % (hi - lo)
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[(self.next() % choices.len() as u64) as usize]
    }

    /// Two-decimal money string, matching the backend's string-typed
    /// price columns.
    fn money(&mut self, lo: u64, hi: u64) -> String {
        let cents = self.range(lo * 100, hi * 100);
        format!("{}.{:02}", cents / 100, cents % 100)
    }

    fn date_within(&mut self, days_back: u64) -> String {
        let (y, m, d) = BASE_DATE;
        let base = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let date = base - Duration::days(self.range(0, days_back) as i64);
        date.format("%Y-%m-%d").to_string()
    }

    fn datetime_within(&mut self, days_back: u64) -> String {
        let date = self.date_within(days_back);
        format!(
            "{}T{:02}:{:02}:{:02}Z",
            date,
            self.range(0, 24),
            self.range(0, 60),
            self.range(0, 60)
        )
    }
}

pub struct MockDataset {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

fn dataset(columns: &[&str], count: usize, mut make: impl FnMut(usize) -> Value) -> MockDataset {
    MockDataset {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: (0..count)
            .filter_map(|i| make(i).as_object().cloned())
            .collect(),
    }
}

pub fn users() -> MockDataset {
    let mut rng = MockRng::new(0xBEEF_0001);
    dataset(
        &["id", "name", "email", "age", "city", "created_at"],
        10_000,
        |i| {
            json!({
                "id": i + 1,
                "name": format!("User {}", i + 1),
                "email": format!("user{}@example.com", i + 1),
                "age": rng.range(18, 68),
                "city": rng.pick(&["New York", "London", "Tokyo", "Paris", "Sydney"]),
                "created_at": rng.date_within(3650),
            })
        },
    )
}

pub fn orders() -> MockDataset {
    let mut rng = MockRng::new(0xBEEF_0002);
    dataset(
        &["order_id", "customer_id", "product", "quantity", "price", "order_date", "status"],
        5_000,
        |i| {
            json!({
                "order_id": i + 1,
                "customer_id": rng.range(1, 1001),
                "product": rng.pick(&["Laptop", "Phone", "Tablet", "Monitor", "Keyboard"]),
                "quantity": rng.range(1, 6),
                "price": rng.money(100, 2100),
                "order_date": rng.date_within(3650),
                "status": rng.pick(&["Pending", "Shipped", "Delivered", "Cancelled"]),
            })
        },
    )
}

pub fn products() -> MockDataset {
    let mut rng = MockRng::new(0xBEEF_0003);
    dataset(
        &["product_id", "name", "category", "price", "stock", "supplier"],
        2_000,
        |i| {
            json!({
                "product_id": i + 1,
                "name": format!("Product {}", i + 1),
                "category": rng.pick(&["Electronics", "Clothing", "Food", "Books", "Toys"]),
                "price": rng.money(10, 510),
                "stock": rng.range(0, 1000),
                "supplier": format!("Supplier {}", rng.range(1, 51)),
            })
        },
    )
}

pub fn employees() -> MockDataset {
    let mut rng = MockRng::new(0xBEEF_0004);
    dataset(
        &["emp_id", "first_name", "last_name", "department", "salary", "hire_date"],
        3_000,
        |i| {
            json!({
                "emp_id": i + 1,
                "first_name": rng.pick(&["John", "Jane", "Mike", "Sarah", "David", "Emily"]),
                "last_name": rng.pick(&["Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia"]),
                "department": rng.pick(&["Engineering", "Sales", "Marketing", "HR", "Finance"]),
                "salary": rng.range(50_000, 150_000),
                "hire_date": rng.date_within(3650),
            })
        },
    )
}

pub fn transactions() -> MockDataset {
    let mut rng = MockRng::new(0xBEEF_0005);
    dataset(
        &["transaction_id", "account_id", "type", "amount", "balance", "timestamp"],
        15_000,
        |i| {
            json!({
                "transaction_id": i + 1,
                "account_id": rng.range(1, 501),
                "type": rng.pick(&["Deposit", "Withdrawal", "Transfer"]),
                "amount": rng.money(0, 10_000),
                "balance": rng.money(0, 100_000),
                "timestamp": rng.datetime_within(3650),
            })
        },
    )
}

/// Dataset for a canned query key, if it is one of the five.
pub fn dataset_for_key(key: &str) -> Option<MockDataset> {
    match key {
        "SELECT * FROM users" => Some(users()),
        "SELECT * FROM orders" => Some(orders()),
        "SELECT * FROM products" => Some(products()),
        "SELECT * FROM employees" => Some(employees()),
        "SELECT * FROM transactions" => Some(transactions()),
        _ => None,
    }
}
