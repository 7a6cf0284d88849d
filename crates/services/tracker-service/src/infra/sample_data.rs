//! Demo dataset for a fresh installation.

use tracing::info;

use common::AppResult;
use domain::employee::parse_start_date;
use domain::{
    NewDepartment, NewEmployee, PERMISSION_HR_READ, PERMISSION_HR_WRITE, PERMISSION_IT_ADMIN,
    PERMISSION_PAYROLL, WELL_KNOWN_PERMISSIONS,
};

use crate::service::Tracker;

const HR_READ: &str = PERMISSION_HR_READ;
const HR_WRITE: &str = PERMISSION_HR_WRITE;
const PAYROLL: &str = PERMISSION_PAYROLL;
const IT_ADMIN: &str = PERMISSION_IT_ADMIN;

/// name, role, start date, salary, address, permissions
type SampleEmployee = (&'static str, &'static str, &'static str, i64, &'static str, &'static [&'static str]);

const EMPLOYEES: &[SampleEmployee] = &[
    ("Alice Johnson", "HR Manager", "2021-04-12", 52000, "10 King Street, London", &[HR_READ, HR_WRITE]),
    ("Ben Carter", "Software Engineer", "2022-09-05", 65000, "22 Baker Street, London", &[IT_ADMIN]),
    ("Chloe Singh", "Payroll Specialist", "2020-01-20", 48000, "18 High Road, Croydon", &[PAYROLL, HR_READ]),
    ("Daniel Evans", "Customer Support", "2023-02-01", 32000, "3 Station Road, Watford", &[]),
    ("Evelyn Brown", "Finance Analyst", "2021-11-15", 56000, "77 Queensway, London", &[PAYROLL]),
    ("Frank Mitchell", "Backend Developer", "2020-06-08", 68000, "14 Elm Street, Manchester", &[IT_ADMIN]),
    ("Grace Turner", "Recruitment Officer", "2022-03-14", 45000, "22 Victoria Road, Birmingham", &[HR_READ]),
    ("Hannah Patel", "Data Analyst", "2021-09-30", 59000, "5 Riverside Drive, Leeds", &[IT_ADMIN]),
    ("Ian Robertson", "Systems Administrator", "2019-11-18", 72000, "31 Hill Lane, Bristol", &[IT_ADMIN]),
    ("Jasmine Clark", "Payroll Assistant", "2023-01-09", 40000, "9 Oak Avenue, Liverpool", &[PAYROLL]),
    ("Kevin O'Neill", "DevOps Engineer", "2020-08-03", 70000, "18 Park Crescent, Nottingham", &[IT_ADMIN]),
    ("Laura Simmons", "HR Advisor", "2021-05-21", 48000, "44 Maple Street, Sheffield", &[HR_READ, HR_WRITE]),
    ("Marcus Reed", "Frontend Developer", "2022-07-12", 63000, "7 Grove Lane, Oxford", &[IT_ADMIN]),
    ("Natalie Hughes", "Financial Controller", "2018-04-02", 82000, "11 Harbour Road, Southampton", &[PAYROLL]),
    ("Oliver Grant", "IT Support Technician", "2023-06-05", 35000, "62 Brook Street, Leicester", &[IT_ADMIN]),
    ("Priya Shah", "Business Analyst", "2020-02-17", 61000, "27 Station Road, Reading", &[HR_READ]),
    ("Quentin Moore", "Security Engineer", "2019-10-28", 75000, "3 Mill Lane, Cambridge", &[IT_ADMIN]),
    ("Rachel Adams", "Customer Success Manager", "2021-12-01", 54000, "88 Market Street, York", &[]),
    ("Samuel Davies", "Accountant", "2017-09-19", 60000, "16 Bridge Road, Cardiff", &[PAYROLL]),
    ("Tara Wilson", "UX Designer", "2022-04-25", 58000, "29 Queen Street, Newcastle", &[]),
    ("Umar Khan", "Technical Architect", "2016-03-07", 90000, "2 Kingsway, Edinburgh", &[]),
    ("Victoria Lewis", "HR Administrator", "2023-08-14", 38000, "13 Chapel Street, Coventry", &[HR_READ]),
    ("William Scott", "Product Manager", "2020-11-23", 77000, "40 City Road, Glasgow", &[]),
    ("Xenia Brooks", "Compliance Officer", "2019-01-15", 62000, "6 Manor Close, Plymouth", &[HR_READ, PAYROLL]),
    ("Yusuf Ali", "Network Engineer", "2021-07-06", 69000, "55 Green Lane, Derby", &[IT_ADMIN]),
];

/// name, description, head, members (indexes into `EMPLOYEES`)
type SampleDepartment = (&'static str, &'static str, usize, &'static [usize]);

const DEPARTMENTS: &[SampleDepartment] = &[
    ("Human Resources", "Hiring, onboarding, policies", 0, &[0, 6, 11, 21, 23]),
    ("Engineering", "Product development and systems", 20, &[1, 5, 7, 12, 15, 19, 20, 22]),
    ("Finance", "Budgeting, payroll, reporting", 13, &[2, 4, 9, 13, 18]),
    ("Support", "Customer support operations", 17, &[3, 17]),
    ("IT Operations", "Infrastructure, support, security, networks", 8, &[8, 10, 14, 16, 24]),
];

/// Build the demo tracker. Every employee gets `password`.
pub fn generate_sample_data(password: &str) -> AppResult<Tracker> {
    let mut tracker = Tracker::new();

    for name in WELL_KNOWN_PERMISSIONS {
        tracker.create_permission(name)?;
    }

    let mut ids = Vec::with_capacity(EMPLOYEES.len());
    for &(name, role, start_date, salary, address, permissions) in EMPLOYEES {
        let new = NewEmployee {
            name: name.to_string(),
            role: role.to_string(),
            start_date: parse_start_date(start_date)?,
            salary,
            address: address.to_string(),
            password: password.to_string(),
            permissions: Vec::new(),
        }
        .with_permissions(permissions.iter().copied());
        ids.push(tracker.create_employee(new)?);
    }

    for &(name, description, head, members) in DEPARTMENTS {
        tracker.create_department(NewDepartment {
            name: name.to_string(),
            description: description.to_string(),
            head_of_department: ids[head].clone(),
            parent_department: None,
            members: members.iter().map(|&idx| ids[idx].clone()).collect(),
        })?;
    }

    info!(
        employees = tracker.employee_count(),
        departments = tracker.department_count(),
        permissions = tracker.permission_count(),
        "Generated sample data"
    );
    Ok(tracker)
}
