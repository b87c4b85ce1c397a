use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use technews_cli::{
    add_comment, add_post, add_user, add_vote, clear_data, connect, delete_user, handle_error,
    init, list_users, load_connspec, migrate, print_json, show_user, Result, UserKey,
    CONNECTION_ENV,
};

#[derive(Parser)]
#[command(
    name = "technews",
    version,
    about = "Manages the technews user database",
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity,
    /// Connection as BACKEND:CONNECTION. Overrides the one saved by init.
    #[arg(long, global = true, env = CONNECTION_ENV)]
    connection: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database connection.
    Init {
        /// Database backend to use. Only 'sqlite' is available.
        backend: String,
        /// Database connection string. Format depends on backend.
        #[arg(value_name = "CONNECTION")]
        conn_str: String,
    },
    /// Create any missing tables.
    Migrate,
    /// Delete all rows from all tables. The schema is left intact.
    ClearData,
    /// Manage users.
    #[command(subcommand)]
    User(UserCommands),
    /// Manage posts.
    #[command(subcommand)]
    Post(PostCommands),
    /// Manage votes.
    #[command(subcommand)]
    Vote(VoteCommands),
    /// Manage comments.
    #[command(subcommand)]
    Comment(CommentCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user and print it.
    Add {
        username: String,
        email: String,
        password: String,
    },
    /// Print a user with all its posts, votes and comments.
    Show {
        /// User id or email.
        user: String,
    },
    /// Print all users with their posts.
    List,
    /// Delete a user with everything it owns.
    Delete {
        /// User id or email.
        user: String,
    },
}

#[derive(Subcommand)]
enum PostCommands {
    /// Submit a post on behalf of a user.
    Add {
        /// User id or email.
        user: String,
        title: String,
        url: String,
    },
}

#[derive(Subcommand)]
enum VoteCommands {
    /// Vote on a post on behalf of a user.
    Add {
        /// User id or email.
        user: String,
        post_id: i64,
    },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Comment on a post on behalf of a user.
    Add {
        /// User id or email.
        user: String,
        post_id: i64,
        text: String,
    },
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();
    handle_error(run(cli));
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { backend, conn_str } = &cli.command {
        init(backend, conn_str)?;
        println!("Saved {backend} connection");
        return Ok(());
    }

    let spec = load_connspec(cli.connection.as_deref())?;
    let mut conn = connect(&spec)?;
    match cli.command {
        Commands::Init { .. } => {}
        Commands::Migrate => {
            migrate(&mut conn)?;
            println!("Schema is up to date");
        }
        Commands::ClearData => {
            clear_data(&mut conn)?;
            println!("Deleted all data");
        }
        Commands::User(cmd) => match cmd {
            UserCommands::Add {
                username,
                email,
                password,
            } => print_json(&add_user(&mut conn, &username, &email, &password)?)?,
            UserCommands::Show { user } => {
                print_json(&show_user(&conn, &UserKey::from(user.as_str()))?)?
            }
            UserCommands::List => print_json(&list_users(&conn)?)?,
            UserCommands::Delete { user } => {
                let id = delete_user(&mut conn, &UserKey::from(user.as_str()))?;
                println!("Deleted user {id}");
            }
        },
        Commands::Post(PostCommands::Add { user, title, url }) => print_json(&add_post(
            &mut conn,
            &UserKey::from(user.as_str()),
            &title,
            &url,
        )?)?,
        Commands::Vote(VoteCommands::Add { user, post_id }) => {
            print_json(&add_vote(&mut conn, &UserKey::from(user.as_str()), post_id)?)?
        }
        Commands::Comment(CommentCommands::Add {
            user,
            post_id,
            text,
        }) => print_json(&add_comment(
            &mut conn,
            &UserKey::from(user.as_str()),
            post_id,
            &text,
        )?)?,
    }
    Ok(())
}
