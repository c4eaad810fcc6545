use std::sync::Arc;

use anyhow::{Context, Result, bail};
use attendify_client::{Collection, PageSource};
use attendify_core::{
    Activity, Event, Group, ListQueryState, Location, PageSize, Resource, SortDirection, User, routes,
};
use attendify_service::{CellValue, ColumnDescriptor, ListView, PaginationFooter, TableModel};
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;

use crate::context::AppContext;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ResourceKind {
    Groups,
    Users,
    Locations,
    Projects,
    Activities,
}

#[derive(Debug, Default, Args)]
pub(crate) struct ListArgs {
    /// Saved view state, e.g. "page=2&pageSize=20&search=ops"
    #[arg(short, long)]
    pub(crate) query: Option<String>,
    #[arg(short, long)]
    pub(crate) page: Option<u32>,
    /// One of 10, 20, 30, 40, 50
    #[arg(long)]
    pub(crate) page_size: Option<u32>,
    #[arg(short, long)]
    pub(crate) search: Option<String>,
    /// Sort key as COLUMN or COLUMN:desc; repeat for secondary keys
    #[arg(long)]
    pub(crate) sort: Vec<String>,
    /// Column filter as COLUMN=TEXT
    #[arg(long)]
    pub(crate) filter: Vec<String>,
    /// Column to hide
    #[arg(long)]
    pub(crate) hide: Vec<String>,
}

impl ListArgs {
    /// Query string to mount the view with: the saved query overlaid with
    /// explicit flags.
    fn initial_query(&self) -> Result<String> {
        let mut state = ListQueryState::from_query(self.query.as_deref().unwrap_or_default());
        if let Some(page) = self.page {
            state.page = page.max(1);
        }
        if let Some(size) = self.page_size {
            state.page_size = PageSize::try_from(size)?;
            if self.page.is_none() {
                state.page = 1;
            }
        }
        if let Some(search) = &self.search {
            search.trim().clone_into(&mut state.search);
            if self.page.is_none() {
                state.page = 1;
            }
        }
        Ok(state.to_query())
    }

    fn sort_keys(&self) -> Result<Vec<(String, SortDirection)>> {
        self.sort
            .iter()
            .map(|raw| -> Result<(String, SortDirection)> {
                match raw.split_once(':') {
                    Some((column, dir)) => Ok((column.to_owned(), dir.parse::<SortDirection>()?)),
                    None => Ok((raw.clone(), SortDirection::Asc)),
                }
            })
            .collect()
    }

    fn filters(&self) -> Result<Vec<(&str, &str)>> {
        self.filter
            .iter()
            .map(|raw| raw.split_once('=').with_context(|| format!("filter must be COLUMN=TEXT, got '{raw}'")))
            .collect()
    }
}

fn group_columns() -> Vec<ColumnDescriptor<Group>> {
    vec![
        ColumnDescriptor::new("name", "Name", |g: &Group| CellValue::text(&g.name)).sortable().filterable().pinned(),
        ColumnDescriptor::new("description", "Description", |g: &Group| {
            CellValue::optional(g.description.clone(), CellValue::Text)
        })
        .filterable(),
        ColumnDescriptor::new("members", "Members", |g: &Group| {
            CellValue::Integer(i64::try_from(g.members.len()).unwrap_or(i64::MAX))
        })
        .sortable(),
        ColumnDescriptor::new("created", "Created", |g: &Group| CellValue::Date(g.created_at)).sortable(),
    ]
}

pub(crate) fn user_columns() -> Vec<ColumnDescriptor<User>> {
    vec![
        ColumnDescriptor::new("username", "Username", |u: &User| CellValue::text(&u.username))
            .sortable()
            .filterable()
            .pinned(),
        ColumnDescriptor::new("name", "Name", |u: &User| CellValue::text(u.display_name())).sortable().filterable(),
        ColumnDescriptor::new("email", "Email", |u: &User| CellValue::text(&u.email)).sortable().filterable(),
        ColumnDescriptor::new("created", "Created", |u: &User| CellValue::optional(u.created_at, CellValue::Date))
            .sortable(),
    ]
}

fn location_columns() -> Vec<ColumnDescriptor<Location>> {
    vec![
        ColumnDescriptor::new("name", "Name", |l: &Location| CellValue::text(&l.name)).sortable().filterable().pinned(),
        ColumnDescriptor::new("latitude", "Latitude", |l: &Location| CellValue::Number(l.latitude)).sortable(),
        ColumnDescriptor::new("longitude", "Longitude", |l: &Location| CellValue::Number(l.longitude)).sortable(),
        ColumnDescriptor::new("sub_locations", "Sub-locations", |l: &Location| {
            CellValue::Integer(i64::try_from(l.sub_locations.len()).unwrap_or(i64::MAX))
        }),
    ]
}

fn project_columns() -> Vec<ColumnDescriptor<Event>> {
    vec![
        ColumnDescriptor::new("name", "Name", |e: &Event| CellValue::text(&e.name)).sortable().filterable().pinned(),
        ColumnDescriptor::new("year", "Year", |e: &Event| CellValue::Integer(i64::from(e.year))).sortable(),
        ColumnDescriptor::new("type", "Type", |e: &Event| {
            CellValue::optional(e.event_type.as_ref(), |t| CellValue::text(&t.name))
        })
        .filterable(),
        ColumnDescriptor::new("start", "Start", |e: &Event| CellValue::Date(e.start_date)).sortable(),
        ColumnDescriptor::new("end", "End", |e: &Event| CellValue::Date(e.end_date)).sortable(),
        ColumnDescriptor::new("announce", "Announced", |e: &Event| CellValue::Bool(e.announce)),
    ]
}

fn activity_columns() -> Vec<ColumnDescriptor<Activity>> {
    vec![
        ColumnDescriptor::new("name", "Name", |a: &Activity| CellValue::text(&a.name)).sortable().filterable().pinned(),
        ColumnDescriptor::new("start", "Start", |a: &Activity| CellValue::Date(a.start_at)).sortable(),
        ColumnDescriptor::new("end", "End", |a: &Activity| CellValue::Date(a.end_at)).sortable(),
        ColumnDescriptor::new("hours", "Hours", |a: &Activity| CellValue::Number(a.hour)).sortable(),
        ColumnDescriptor::new("radius", "Radius (m)", |a: &Activity| CellValue::Number(a.check_radius)),
        ColumnDescriptor::new("register", "Registration", |a: &Activity| CellValue::Bool(a.is_register)),
    ]
}

/// Mounts a list view, fetches the requested page and prints it.
pub(crate) async fn show_list<T>(
    ctx: &AppContext,
    source: Arc<dyn PageSource<T>>,
    route: &str,
    detail_route: Option<&'static str>,
    columns: &[ColumnDescriptor<T>],
    args: &ListArgs,
) -> Result<()>
where
    T: Resource + Clone + Send + 'static,
{
    let sort = args.sort_keys()?;
    let filters = args.filters()?;

    let view = ListView::mount(source, route, &args.initial_query()?, ctx.notices.clone());
    let fetched = view.refresh().await;
    ctx.flush_notices();
    fetched?;

    for (column, direction) in &sort {
        view.toggle_sort(column, true).await;
        if *direction == SortDirection::Desc {
            view.toggle_sort(column, true).await;
        }
    }

    let snapshot = view.snapshot().await;
    let mut model = TableModel::new(columns, &snapshot.page.items)
        .with_sort(&snapshot.query.sort)
        .with_row_numbers(snapshot.query.offset());
    if let Some(template) = detail_route {
        model = model.with_row_action(move |row: &T| routes::with_id(template, row.id()));
    }
    for (column, text) in filters {
        if !model.set_filter(column, text) {
            bail!("column '{column}' cannot be filtered");
        }
    }
    for column in &args.hide {
        if !model.hide(column) {
            bail!("column '{column}' cannot be hidden");
        }
    }

    println!("{}", render::table(&model));
    println!("{}", render::footer(&PaginationFooter::new(&snapshot.query, &snapshot.page)));
    println!("View: {}", snapshot.location);
    Ok(())
}

async fn list_resource<T>(
    ctx: &AppContext,
    route: &str,
    detail_route: &'static str,
    columns: &[ColumnDescriptor<T>],
    args: &ListArgs,
) -> Result<()>
where
    T: Resource + DeserializeOwned,
{
    let source: Arc<dyn PageSource<T>> = Arc::new(Collection::<T>::of(Arc::clone(&ctx.client)));
    show_list(ctx, source, route, Some(detail_route), columns, args).await
}

pub(crate) async fn run_list(resource: ResourceKind, args: &ListArgs) -> Result<()> {
    let ctx = AppContext::from_env()?;
    ctx.signed_in().await?;
    match resource {
        ResourceKind::Groups => list_resource(&ctx, routes::GROUPS, routes::GROUP_VIEW, &group_columns(), args).await,
        ResourceKind::Users => list_resource(&ctx, routes::USERS, routes::USER_VIEW, &user_columns(), args).await,
        ResourceKind::Locations => {
            list_resource(&ctx, routes::LOCATIONS, routes::LOCATION_VIEW, &location_columns(), args).await
        },
        ResourceKind::Projects => {
            list_resource(&ctx, routes::PROJECTS, routes::PROJECT_VIEW, &project_columns(), args).await
        },
        ResourceKind::Activities => {
            list_resource(&ctx, routes::ACTIVITIES, routes::ACTIVITY_VIEW, &activity_columns(), args).await
        },
    }
}
