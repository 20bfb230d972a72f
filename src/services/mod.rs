pub mod accounting;
pub mod context;
pub mod crud;
pub mod error;
pub mod hr;
pub mod inventory;
pub mod production;
pub mod project;
pub mod purchase;
pub mod sales;
pub mod users;

use std::sync::Arc;

pub use context::RequestContext;
pub use crud::{CrudService, MemoryCrud, Resource};
pub use error::{Entity, ServiceError};

use crate::database::models::{Account, Customer, Department, Employee, Product, Project, Supplier, Warehouse, WorkOrder};
use accounting::JournalService;
use hr::DepartmentService;
use sales::SalesOrderService;
use users::UserService;

/// Every collaborator the controllers call, wired once at startup
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub accounts: Arc<dyn CrudService<Account>>,
    pub journal_entries: Arc<JournalService>,
    pub products: Arc<dyn CrudService<Product>>,
    pub warehouses: Arc<dyn CrudService<Warehouse>>,
    pub customers: Arc<dyn CrudService<Customer>>,
    pub sales_orders: Arc<SalesOrderService>,
    pub suppliers: Arc<dyn CrudService<Supplier>>,
    pub work_orders: Arc<dyn CrudService<WorkOrder>>,
    pub departments: Arc<dyn CrudService<Department>>,
    pub employees: Arc<dyn CrudService<Employee>>,
    pub projects: Arc<dyn CrudService<Project>>,
}

impl Services {
    /// In-memory collaborators
    pub fn in_memory() -> Self {
        let accounts: Arc<dyn CrudService<Account>> = Arc::new(MemoryCrud::<Account>::new("accounts"));
        let products: Arc<dyn CrudService<Product>> = Arc::new(MemoryCrud::<Product>::new("products"));
        let customers: Arc<dyn CrudService<Customer>> = Arc::new(MemoryCrud::<Customer>::new("customers"));
        let employees = Arc::new(MemoryCrud::<Employee>::new("employees"));

        Self {
            users: Arc::new(UserService::new()),
            journal_entries: Arc::new(JournalService::new(accounts.clone())),
            sales_orders: Arc::new(SalesOrderService::new(customers.clone(), products.clone())),
            accounts,
            products,
            customers,
            warehouses: Arc::new(MemoryCrud::<Warehouse>::new("warehouses")),
            suppliers: Arc::new(MemoryCrud::<Supplier>::new("suppliers")),
            work_orders: Arc::new(MemoryCrud::<WorkOrder>::new("work_orders")),
            departments: Arc::new(DepartmentService::new(employees.clone())),
            employees,
            projects: Arc::new(MemoryCrud::<Project>::new("projects")),
        }
    }
}
