use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trash_engine::{db, Config, PgTreeStore, TrashEngine};
use trash_shared::api::{DeletePageRequest, PaginationOptions, TrashListParams};
use uuid::Uuid;

const USAGE: &str = "\
Usage: trash-engine <COMMAND>

Commands:
  migrate                                   Apply database migrations
  list <SPACE_ID> [--page N] [--limit N]    List deletion roots in a space
  delete <PAGE_ID> <ACTOR_ID> [--force]     Move a page subtree to the trash (or purge it)
  restore <PAGE_ID>                         Restore a page subtree from the trash
  purge <PAGE_ID>                           Permanently remove a page subtree";

#[derive(Debug, PartialEq)]
enum Command {
    Migrate,
    List(TrashListParams),
    Delete(DeletePageRequest, Uuid),
    Restore(Uuid),
    Purge(Uuid),
    Help,
}

fn parse_uuid(value: Option<&String>, name: &str) -> Result<Uuid> {
    let value = value.with_context(|| format!("missing {}", name))?;
    Uuid::parse_str(value).with_context(|| format!("invalid {}: {}", name, value))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "migrate" => Ok(Command::Migrate),
        "list" => {
            let space_id = parse_uuid(args.get(1), "SPACE_ID")?;
            let mut pagination = PaginationOptions::default();

            let mut i = 2;
            while i < args.len() {
                let value = args
                    .get(i + 1)
                    .with_context(|| format!("{} requires a value", args[i]))?;
                match args[i].as_str() {
                    "--page" => pagination.page = Some(value.parse::<u32>().context("invalid --page")?),
                    "--limit" => {
                        pagination.limit = Some(value.parse::<u32>().context("invalid --limit")?)
                    }
                    other => bail!("Unknown argument: {}", other),
                }
                i += 2;
            }

            Ok(Command::List(TrashListParams {
                space_id,
                pagination,
            }))
        }
        "delete" => {
            let page_id = parse_uuid(args.get(1), "PAGE_ID")?;
            let actor_id = parse_uuid(args.get(2), "ACTOR_ID")?;
            let force_delete = match args.get(3).map(String::as_str) {
                None => false,
                Some("--force") => true,
                Some(other) => bail!("Unknown argument: {}", other),
            };
            Ok(Command::Delete(
                DeletePageRequest {
                    page_id,
                    force_delete,
                },
                actor_id,
            ))
        }
        "restore" => Ok(Command::Restore(parse_uuid(args.get(1), "PAGE_ID")?)),
        "purge" => Ok(Command::Purge(parse_uuid(args.get(1), "PAGE_ID")?)),
        "--help" | "-h" | "help" => Ok(Command::Help),
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trash_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if matches!(command, Command::Help) {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    if matches!(command, Command::Migrate) {
        return db::run_migrations(&pool).await;
    }

    let engine = TrashEngine::new(PgTreeStore::new(pool), config.engine);

    match command {
        Command::List(params) => {
            print_json(&engine.list_trash(params.space_id, params.pagination).await?)
        }
        Command::Delete(req, actor_id) => print_json(&engine.delete_page(req, actor_id).await?),
        Command::Restore(page_id) => print_json(&engine.restore(page_id).await?),
        Command::Purge(page_id) => print_json(&engine.purge(page_id).await?),
        Command::Migrate | Command::Help => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn list_with_pagination() {
        let space = Uuid::new_v4();
        let command = parse_args(&args(&["list", &space.to_string(), "--page", "2", "--limit", "5"]))
            .unwrap();
        assert_eq!(
            command,
            Command::List(TrashListParams {
                space_id: space,
                pagination: PaginationOptions::new(2, 5),
            })
        );
    }

    #[test]
    fn delete_with_force_flag() {
        let page = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let command = parse_args(&args(&[
            "delete",
            &page.to_string(),
            &actor.to_string(),
            "--force",
        ]))
        .unwrap();
        assert_eq!(
            command,
            Command::Delete(
                DeletePageRequest {
                    page_id: page,
                    force_delete: true,
                },
                actor
            )
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["restore", "not-a-uuid"])).is_err());
        assert!(parse_args(&args(&["purge"])).is_err());
        assert!(parse_args(&args(&["list", &Uuid::nil().to_string(), "--page"])).is_err());
        assert!(parse_args(&args(&["explode"])).is_err());
    }
}
