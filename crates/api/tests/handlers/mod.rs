mod appointments_test;
