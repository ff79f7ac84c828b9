//! Terminal front end: a stdin REPL over the wizard, search, bookings, and
//! profile operations.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use crate::api::Api;
use crate::error::Result;
use crate::models::{BookingRequest, ContactInfo, Passenger, Traveller};
use crate::profile::{self, PasswordForm, PersonalDetailsForm, Preferences, TravellerBook};
use crate::search::{FlightSearchForm, TripType, airports};
use crate::session::SessionStore;
use crate::storage::KeyValueStore;
use crate::wizard::{AuthModal, Completion, Field, Step, SubmitReport};

const HELP: &str = "\
Commands:
  signin                         open the sign-in window
  email|password|code|first|last <value>
  submit | back | close | resend
  whoami | logout
  airports <query>
  search <FROM> <TO> <YYYY-MM-DD> [<RETURN-DATE>] [travelers]
  flight <id>
  book <flight-id> <phone>
  bookings | booking <id>
  rename <first> <last>
  passwd <current> <new> <confirm>
  travellers | traveller add <first> <last> | traveller rm <id>
  prefs
  help | quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SignIn,
    Set(Field, String),
    Submit,
    Back,
    Close,
    Resend,
    WhoAmI,
    Logout,
    Airports(String),
    Search {
        from: String,
        to: String,
        depart: NaiveDate,
        ret: Option<NaiveDate>,
        travelers: u8,
    },
    Flight(String),
    Book {
        flight_id: String,
        phone: String,
    },
    Bookings,
    Booking(String),
    Rename {
        first: String,
        last: String,
    },
    Passwd {
        current: String,
        new: String,
        confirm: String,
    },
    Travellers,
    AddTraveller {
        first: String,
        last: String,
    },
    RemoveTraveller(String),
    Prefs,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("bad date {s:?}, use YYYY-MM-DD"))
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let field = |f: Field| {
            if rest.is_empty() {
                Err(format!("usage: {head} <value>"))
            } else {
                Ok(Self::Set(f, rest.to_string()))
            }
        };

        match (head.to_lowercase().as_str(), args.as_slice()) {
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit" | "/quit", _) => Ok(Self::Quit),
            ("signin" | "login", []) => Ok(Self::SignIn),
            ("email", _) => field(Field::Email),
            ("password", _) => field(Field::Password),
            ("code", _) => field(Field::Code),
            ("first", _) => field(Field::FirstName),
            ("last", _) => field(Field::LastName),
            ("submit", []) => Ok(Self::Submit),
            ("back", []) => Ok(Self::Back),
            ("close", []) => Ok(Self::Close),
            ("resend", []) => Ok(Self::Resend),
            ("whoami", []) => Ok(Self::WhoAmI),
            ("logout", []) => Ok(Self::Logout),
            ("airports", _) => Ok(Self::Airports(rest.to_string())),
            ("search", [from, to, depart, more @ ..]) => {
                let depart = parse_date(depart)?;
                let (ret, travelers) = match more {
                    [] => (None, 1),
                    [one] => match one.parse::<u8>() {
                        Ok(n) => (None, n),
                        Err(_) => (Some(parse_date(one)?), 1),
                    },
                    [ret, n] => (
                        Some(parse_date(ret)?),
                        n.parse().map_err(|_| format!("bad traveler count {n:?}"))?,
                    ),
                    _ => return Err("usage: search <FROM> <TO> <DATE> [<RETURN>] [travelers]".into()),
                };
                Ok(Self::Search {
                    from: from.to_uppercase(),
                    to: to.to_uppercase(),
                    depart,
                    ret,
                    travelers,
                })
            }
            ("flight", [id]) => Ok(Self::Flight(id.to_string())),
            ("book", [flight_id, phone]) => Ok(Self::Book {
                flight_id: flight_id.to_string(),
                phone: phone.to_string(),
            }),
            ("bookings", []) => Ok(Self::Bookings),
            ("booking", [id]) => Ok(Self::Booking(id.to_string())),
            ("rename", [first, last]) => Ok(Self::Rename {
                first: first.to_string(),
                last: last.to_string(),
            }),
            ("passwd", [current, new, confirm]) => Ok(Self::Passwd {
                current: current.to_string(),
                new: new.to_string(),
                confirm: confirm.to_string(),
            }),
            ("travellers", []) => Ok(Self::Travellers),
            ("traveller", ["add", first, last]) => Ok(Self::AddTraveller {
                first: first.to_string(),
                last: last.to_string(),
            }),
            ("traveller", ["rm", id]) => Ok(Self::RemoveTraveller(id.to_string())),
            ("prefs", []) => Ok(Self::Prefs),
            _ => Err(format!("unrecognised command {line:?}; type 'help'")),
        }
    }
}

/// Everything the REPL operates on.
pub struct Repl {
    api: Api,
    session: Arc<SessionStore>,
    modal: AuthModal,
    storage: Arc<dyn KeyValueStore>,
}

impl Repl {
    pub fn new(api: Api, session: Arc<SessionStore>, storage: Arc<dyn KeyValueStore>) -> Self {
        let modal = AuthModal::new(api.auth.clone(), session.clone());
        Self {
            api,
            session,
            modal,
            storage,
        }
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{HELP}");
        eprint!("> ");
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                eprint!("> ");
                continue;
            }
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(cmd) => {
                    if let Err(e) = self.execute(cmd).await {
                        println!("error: {e}");
                    }
                }
                Err(msg) => println!("{msg}"),
            }
            eprint!("> ");
        }
        Ok(())
    }

    pub async fn execute(&self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
            Command::SignIn => {
                self.modal.open().await;
                self.print_step().await;
            }
            Command::Set(field, value) => self.modal.set(field, value).await?,
            Command::Submit => {
                match self.modal.submit().await? {
                    SubmitReport::Invalid(e) => println!("{e}"),
                    SubmitReport::Completed {
                        completion,
                        notice,
                        demo,
                    } => {
                        if let Some(notice) = notice {
                            print_reply(Some(notice), demo);
                        }
                        if completion == Completion::Finished {
                            if let Some(user) = self.session.user().await {
                                println!("Welcome, {}.", user.display_name());
                            }
                            return Ok(());
                        }
                    }
                }
                self.print_step().await;
            }
            Command::Back => {
                self.modal.back().await;
                self.print_step().await;
            }
            Command::Close => self.modal.close().await,
            Command::Resend => println!("{}", self.modal.resend_code().await?),
            Command::WhoAmI => match self.session.user().await {
                Some(user) => println!("{} <{}> (id {})", user.display_name(), user.email, user.id),
                None => println!("Not signed in."),
            },
            Command::Logout => {
                self.session.logout().await?;
                println!("Signed out.");
            }
            Command::Airports(query) => {
                for airport in airports::filter(&query) {
                    println!("{airport}  {}, {}", airport.name, airport.country);
                }
            }
            Command::Search {
                from,
                to,
                depart,
                ret,
                travelers,
            } => {
                let mut form = FlightSearchForm::new();
                form.trip_type = if ret.is_some() {
                    TripType::RoundTrip
                } else {
                    TripType::OneWay
                };
                form.from = from;
                form.to = to;
                form.departure_date = Some(depart);
                form.return_date = ret;
                form.set_travelers(travelers)?;
                for request in form.to_requests()? {
                    let reply = self.api.flights.search_flights(&request).await?;
                    print_reply(reply.message.as_deref(), reply.demo);
                    for f in &reply.data {
                        println!(
                            "{}  {} {}  {} -> {}  {} ({})  {}",
                            f.id,
                            f.airline,
                            f.flight_number,
                            f.departure,
                            f.arrival,
                            f.departure_time,
                            f.duration,
                            f.price
                        );
                    }
                }
            }
            Command::Flight(id) => {
                let reply = self.api.flights.get_flight(&id).await?;
                print_reply(reply.message.as_deref(), reply.demo);
                match reply.data {
                    Some(f) => println!(
                        "{} {}  {} -> {}  {} to {}  {}",
                        f.airline,
                        f.flight_number,
                        f.departure,
                        f.arrival,
                        f.departure_time,
                        f.arrival_time,
                        f.price
                    ),
                    None => println!("Flight not found."),
                }
            }
            Command::Book { flight_id, phone } => {
                let identity = profile::require_identity(&self.session).await?;
                let user = &identity.user;
                let request = BookingRequest {
                    flight_id,
                    passengers: vec![Passenger {
                        first_name: user.first_name.clone(),
                        last_name: user.last_name.clone(),
                        date_of_birth: user
                            .dob
                            .clone()
                            .or_else(|| user.date_of_birth.clone())
                            .unwrap_or_default(),
                        gender: user.gender.clone().unwrap_or_default(),
                        passport_number: user.passport_number.clone(),
                    }],
                    contact_info: ContactInfo {
                        email: user.email.clone(),
                        phone,
                    },
                };
                let reply = self
                    .api
                    .bookings
                    .create_booking(&request, Some(identity.bearer()))
                    .await?;
                print_reply(reply.message.as_deref(), reply.demo);
                if let Some(booking) = reply.data {
                    println!("Booking {} is {} ({})", booking.id, booking.status, booking.total_price);
                }
            }
            Command::Bookings => {
                let reply = profile::booking_history(&self.api.bookings, &self.session).await?;
                print_reply(reply.message.as_deref(), reply.demo);
                if reply.data.is_empty() {
                    println!("No bookings yet.");
                }
                for b in &reply.data {
                    println!("{}  {}  {}", b.id, b.status, b.total_price);
                }
            }
            Command::Booking(id) => {
                let identity = profile::require_identity(&self.session).await?;
                let reply = self
                    .api
                    .bookings
                    .get_booking(&id, Some(identity.bearer()))
                    .await?;
                print_reply(reply.message.as_deref(), reply.demo);
                match reply.data {
                    Some(b) => {
                        println!("{}  {}  {}", b.id, b.status, b.total_price);
                        if let Some(f) = &b.flight {
                            println!("  {} {}  {} -> {}", f.airline, f.flight_number, f.departure, f.arrival);
                        }
                        for p in &b.passengers {
                            println!("  {} {} ({})", p.first_name, p.last_name, p.date_of_birth);
                        }
                    }
                    None => println!("Booking not found."),
                }
            }
            Command::Rename { first, last } => {
                let identity = profile::require_identity(&self.session).await?;
                let mut form = PersonalDetailsForm::from_user(&identity.user);
                form.first_name = first;
                form.last_name = last;
                let reply = form
                    .submit(self.api.account.as_ref(), &self.session)
                    .await?;
                print_reply(reply.message.as_deref(), reply.demo);
            }
            Command::Passwd {
                current,
                new,
                confirm,
            } => {
                let reply = PasswordForm::new(current, new, confirm)
                    .submit(self.api.account.as_ref(), &self.session)
                    .await?;
                print_reply(reply.message.as_deref(), reply.demo);
            }
            Command::Travellers => {
                profile::require_identity(&self.session).await?;
                let book = TravellerBook::load(self.storage.clone()).await;
                if book.list().is_empty() {
                    println!("No saved travellers.");
                }
                for t in book.list() {
                    println!("{}  {}  {}", t.id, t.full_name(), t.nationality_label());
                }
            }
            Command::AddTraveller { first, last } => {
                profile::require_identity(&self.session).await?;
                let mut book = TravellerBook::load(self.storage.clone()).await;
                let id = book
                    .add(Traveller {
                        first_name: first,
                        last_name: last,
                        ..Default::default()
                    })
                    .await?;
                println!("Saved traveller {id}");
            }
            Command::RemoveTraveller(id) => {
                profile::require_identity(&self.session).await?;
                let mut book = TravellerBook::load(self.storage.clone()).await;
                if !book.delete(&id).await? {
                    println!("No traveller {id}");
                }
            }
            Command::Prefs => {
                profile::require_identity(&self.session).await?;
                let prefs = Preferences::load(self.storage.as_ref()).await;
                println!(
                    "language {:?}, currency {}, seat {:?}, email {}, sms {}, promotional {}",
                    prefs.language,
                    prefs.currency.label(),
                    prefs.seat,
                    prefs.notifications.email,
                    prefs.notifications.sms,
                    prefs.notifications.promotional
                );
            }
        }
        Ok(())
    }

    async fn print_step(&self) {
        let view = self.modal.view().await;
        if !view.open {
            return;
        }
        if let Some(error) = &view.error {
            println!("{error}");
        }
        let prompt = match view.step {
            Step::EmailEntry => "Enter your email: email <address>, then submit",
            Step::SignIn => "Welcome back. password <password>, then submit",
            Step::VerifyOtp => "Enter the code we sent: code <otp>, then submit (resend to retry)",
            Step::Register => "Create your account: first, last, password, then submit",
        };
        println!("[{}/4] {prompt}", view.step.number());
    }
}

fn print_reply(message: Option<&str>, demo: bool) {
    if let Some(line) = reply_line(message, demo) {
        println!("{line}");
    }
}

/// Replies synthesized offline are always labeled, even without a message.
fn reply_line(message: Option<&str>, demo: bool) -> Option<String> {
    match (message, demo) {
        (Some(message), false) => Some(message.to_string()),
        (Some(message), true) => Some(format!("(demo) {message}")),
        (None, true) => Some("(demo) offline data".to_string()),
        (None, false) => None,
    }
}
