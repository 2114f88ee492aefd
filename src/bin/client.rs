use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

/// Staff cli for the kot server
#[derive(Parser, Debug)]
#[command(name = "kot-client")]
#[command(about = "client cli used by restaurant staffs to interact with the kot server", version, long_about = None
)]
struct Cli {
    #[arg(long, default_value = "http://localhost:8080", help = "Base url of the kot server")]
    host: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// check staff credentials
    #[command(arg_required_else_help = true)]
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// ticket related ops
    #[command(arg_required_else_help = true)]
    Kot(KotArgs),
}

#[derive(Debug, Args)]
struct KotArgs {
    #[command(subcommand)]
    command: KotCmds,
}

#[derive(Debug, Subcommand)]
enum KotCmds {
    /// submit an order, items given as CODE:QTY:PRICE
    #[command(arg_required_else_help = true)]
    Submit(SubmitArgs),
    /// cancel one line item
    #[command(arg_required_else_help = true)]
    Cancel {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        line_id: i64,
    },
    /// list ticket numbers created between two dates (YYYY-MM-DD)
    #[command(arg_required_else_help = true)]
    List {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// every line of a ticket, cancelled ones included
    #[command(arg_required_else_help = true)]
    Show { kot_no: i32 },
    /// printable lines of a ticket, or of the latest ticket of a user
    #[command(arg_required_else_help = true)]
    Print {
        #[arg(long, conflicts_with = "user")]
        kot: Option<i32>,
        #[arg(long)]
        user: Option<i32>,
    },
}

#[derive(Debug, Args)]
struct SubmitArgs {
    #[arg(long)]
    section: String,
    #[arg(long = "type")]
    order_type: String,
    #[arg(long)]
    table: String,
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..))]
    user: i32,
    #[arg(long, value_name = "CODE:QTY:PRICE", num_args = 1.., required = true)]
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

fn parse_item(raw: &str) -> anyhow::Result<Value> {
    let parts = raw.split(':').collect::<Vec<_>>();
    let [code, qty, price] = parts.as_slice() else {
        anyhow::bail!("item `{raw}` is not CODE:QTY:PRICE");
    };
    let qty: i32 = qty.parse()?;
    let price: Decimal = price.parse()?;
    let total = price
        .checked_mul(Decimal::from(qty))
        .with_context(|| format!("line total of `{raw}` overflows"))?
        .round_dp(2);
    Ok(json!({
        "code": code,
        "quantity": qty,
        "unitPrice": price,
        "lineTotal": total,
    }))
}

async fn report(res: Response) -> anyhow::Result<()> {
    match res.status() {
        StatusCode::OK => {
            let body = res.json::<Value>().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        status => {
            let message = res
                .json::<ErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| "no details".to_string());
            println!("request failed with {}, {}", status, message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let host = args.host.trim_end_matches('/');
    let client = Client::new();

    let res = match args.command {
        Commands::Login { username, password } => {
            client
                .post(format!("{host}/v1/login"))
                .json(&json!({"username": username, "password": password}))
                .send()
                .await?
        }
        Commands::Kot(kot) => match kot.command {
            KotCmds::Submit(submit) => {
                let items = submit
                    .items
                    .iter()
                    .map(|raw| parse_item(raw))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                client
                    .post(format!("{host}/v1/kots"))
                    .json(&json!({
                        "menuSection": submit.section,
                        "orderType": submit.order_type,
                        "tableId": submit.table,
                        "userId": submit.user,
                        "items": items,
                    }))
                    .send()
                    .await?
            }
            KotCmds::Cancel { line_id } => {
                client
                    .put(format!("{host}/v1/kot/cancel"))
                    .json(&json!({"id": line_id}))
                    .send()
                    .await?
            }
            KotCmds::List { from, to } => {
                client
                    .get(format!("{host}/v1/kots"))
                    .query(&[("fromDate", from), ("toDate", to)])
                    .send()
                    .await?
            }
            KotCmds::Show { kot_no } => client.get(format!("{host}/v1/kot/{kot_no}")).send().await?,
            KotCmds::Print { kot: Some(kot_no), .. } => {
                client.get(format!("{host}/v1/kot/{kot_no}/print")).send().await?
            }
            KotCmds::Print { kot: None, user } => {
                client
                    .post(format!("{host}/v1/kot/print"))
                    .json(&json!({"userId": user}))
                    .send()
                    .await?
            }
        },
    };
    report(res).await
}
